pub const SYSTEM_PERSONA: &str =
    "You are a helpful assistant who generates pull request descriptions based on diffs.";

pub const PR_DESCRIPTION: &str = r#"Please generate a **Pull Request description** for the provided diff, following these guidelines:
- The description should begin with a brief summary of the changes using at least 2 sentences and at most 6 sentences.
- Afterwards you should group changes using subheadings for related changes, e.g. Build process improvements, Replacing deprecated methods, etc., as level 3 markdown headings.
- Describe changes to each file with 1 or 2 sentences in the following format: `- <file-name>: <description>`
- Do **not** include the words "Title" and "Description" in your output.
- Format your answer in **Markdown**.
- The description should reflect the changes made as best as possible. To do this, you should group related changes together."#;
