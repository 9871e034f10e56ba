use super::ExportError;
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

const HEADING_STYLE: &str = "Heading1";

/// Title as a level-1 heading, then one paragraph per line of the report.
pub fn to_docx(report_text: &str, title: &str) -> Result<Vec<u8>, ExportError> {
    let heading = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    let mut docx = Docx::new().add_style(heading).add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(title))
            .style(HEADING_STYLE),
    );

    for line in report_text.split('\n') {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buffer.into_inner())
}
