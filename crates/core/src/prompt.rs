//! The instruction sent to the model.
//!
//! The reply format described here is the contract [`crate::parse_outline`]
//! relies on: one nested list literal, nothing before or after it.

/// Default instruction asking for a twenty slide lecture outline.
///
/// The text is sent verbatim, including its typos and the repeated item 9.
pub const DEFAULT_INSTRUCTION: &str = r#"Here is your transcript to reference: {Transcript.txt}, here here is your powerpoint reference: {Template.pptx}Given this lecture transcript here: https://ocw.mit.edu/courses/7-012-introduction-to-biology-fall-2004/d79f25e7725465922f61117286158f6f_CovlKXmuWo.pdf, create a 20 slide powerpoint presentation, giving me the information for each of the slides in this format : give me the bullets for each slide in an array of strings. Have each array of strings be in a array of arrays, and past that in one line in python form and that is all you output. Here is the transcript and template, 

    create an array of arrays in this structure:

    1. the outer array is an array where each element is an array that represents a page.
    2. Each inner array inside the outer array has 6 strings, the first representing the topic for the slide and the follow 5 strings representing the facts in the trascript that pertain to the topic. The very first inner array represents the title page, so it only has one string for the title.
    3. The array should be the only thing you print in response to this prompt, in python form.
    4. Do not label any of the slides with any extra character outside the array. *Important*, only paste the array itself
    5. ALWAYS include a title for the title page FIRST, make it the title of the lecture or total theme of the presentation
    6. DO NOT include any image or spots to include images or new line "\n" characters
    7. NEVER use / or // characters
    8. Also keep the title in its own array layer inside the outer array, like it is a slide title but on its own
    9. Make sure you are generating long, detailed, and specific bullet points for a total of 20 slides. This is at the college level.
    9. Triple check that you are completely closing every array component that has square brackets. Make sure "[] was never closed" error never happens

"#;

/// Render the sampling parameter string the server receives.
pub fn render_parameter(temperature: f32) -> String {
    format!("temperature {}", temperature)
}
