//! Prompts sent to the model for report generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how the model is instructed
//!    (new packages, stricter table rules) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the rendered instruction block
//!    without calling a model, making prompt regressions easy to catch.
//!
//! Callers can override the system instruction via
//! [`crate::config::GenerationConfig::system_instruction`]; the constant here
//! is used only when no override is provided.

use crate::report::UploadedFile;

/// Default system role for the model.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a professional academic writer. You specialize in LaTeX, TikZ, and data analysis. You are meticulous about reading all provided data pages.";

/// Label placed in front of a plain-text guide.
pub const GUIDE_TEXT_LABEL: &str = "Experiment Guide Content:\n";

/// Build the instruction block that follows the guide and the data photos.
///
/// The image count and file list are spelled out so the model attends to
/// every attachment, and the template is appended verbatim at the end.
pub fn build_instructions(template: &str, guide_name: Option<&str>, images: &[UploadedFile]) -> String {
    let image_count = images.len();
    let image_names = images
        .iter()
        .enumerate()
        .map(|(i, img)| format!("Image {}: {}", i + 1, img.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let guide_name = guide_name.unwrap_or("guide");

    format!(
        r#"You are an expert academic laboratory assistant. Your task is to write a complete, high-quality laboratory report in LaTeX format.

**Inputs Provided:**
1. **LaTeX Template**: A .tex file skeleton.
2. **Experiment Guide**: The lab manual (PDF or Text). It contains the theory, procedure, and diagrams.
3. **Data Images**: I have attached **{image_count}** image(s) containing handwritten data. Files: [{image_names}].

**Instructions:**

1.  **LaTeX Formatting & Packages**:
    -   Use the provided template.
    -   **CRITICAL**: Check if the template includes `tikz`, `pgfplots`, `float`, and `booktabs`. If not, add these to the preamble if you can, or ensure the code works with standard packages.
    -   Ensure strict tabular syntax. Use `booktabs` commands (`\toprule`, `\midrule`, `\bottomrule`) for professional tables if the package is available.
    -   Output **ONLY** the raw LaTeX code. Do not use Markdown code blocks.

2.  **Content Paraphrasing**:
    -   **Rewrite** the Theory and Procedure. Do not copy verbatim.
    -   Use passive voice, past tense for the Procedure (e.g., "The circuit was connected..." instead of "Connect the circuit").

3.  **Data Processing (CRITICAL - MULTI-IMAGE SUPPORT)**:
    -   **You must extract data from ALL {image_count} provided images.**
    -   Do not stop after the first image. The data tables often continue from one page to the next.
    -   If Image 1 has Table 1 and Image 2 has Table 2 (or more rows for Table 1), combine them intelligently.
    -   Consolidate all values into the report's data tables.
    -   Perform all calculations (averages, uncertainties, slopes) and populate the Analysis section.

4.  **Handling Guide Images (TikZ vs Placeholders)**:
    -   **Schematics/Diagrams**: If the guide contains circuit diagrams, optical setups, or simple geometric figures, **redraw them using TikZ** within the LaTeX code. This is preferred over placeholders.
    -   **Complex Photos**: If the guide contains complex photos (e.g., equipment screenshots) that cannot be drawn with TikZ, insert a clear placeholder:
        {placeholder}

**Template to Fill:**
{template}
"#,
        placeholder = figure_placeholder(guide_name),
    )
}

/// LaTeX figure the model inserts where a guide image cannot be redrawn.
pub fn figure_placeholder(guide_name: &str) -> String {
    format!(
        "\\begin{{figure}}[H] \\centering \\fbox{{\\parbox{{0.8\\textwidth}}{{\\centering \\vspace{{2cm}} [IMAGE PLACEHOLDER: Please insert the '{guide_name}' screenshot here] \\vspace{{2cm}}}}}} \\caption{{Experimental Setup}} \\end{{figure}}"
    )
}

/// Text part used for a plain-text guide (or an absent one).
pub fn guide_text_block(guide_text: &str) -> String {
    format!("{GUIDE_TEXT_LABEL}{guide_text}")
}
