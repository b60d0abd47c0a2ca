//! Instruction blocks that pin the model to a parseable JSON reply.

const SINGLE_TEMPLATE: &str = r#"Extract text from the image, describe the image, and respond to the prompt.
Please reply in the following JSON format.
{
    "extracted_text": "Extracted text (empty string if no text)",
    "description": "Description of the image (empty string if not needed)",
    "prompt_response": "Response to the prompt (empty string if no prompt)"
}"#;

const PAIR_TEMPLATE: &str = r#"Extract text from both images, describe both images, and respond to the prompt.
Please reply in the following JSON format.
{
    "image1": {
        "extracted_text": "Extracted text from first image (empty string if no text)",
        "description": "Description of first image (empty string if not needed)"
    },
    "image2": {
        "extracted_text": "Extracted text from second image (empty string if no text)",
        "description": "Description of second image (empty string if not needed)"
    },
    "prompt_response": "Response to the prompt (empty string if no prompt)"
}"#;

fn with_prompt(template: &str, prompt: &str) -> String {
    if prompt.is_empty() {
        template.to_string()
    } else {
        format!("{template}\nPrompt: {prompt}")
    }
}

pub fn single_image_instructions(prompt: &str) -> String {
    with_prompt(SINGLE_TEMPLATE, prompt)
}

pub fn image_pair_instructions(prompt: &str) -> String {
    with_prompt(PAIR_TEMPLATE, prompt)
}
