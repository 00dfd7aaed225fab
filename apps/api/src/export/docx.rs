use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts, Style, StyleType};
use thiserror::Error;

use crate::ats::headers::{parse_header_line, Section, SECTION_LEVEL};

const BODY_FONT: &str = "Calibri";
/// Half-points, as OOXML measures them.
const BODY_SIZE: usize = 22;
const NAME_SIZE: usize = 36;
const SECTION_HEADING_SIZE: usize = 28;
const SUB_HEADING_SIZE: usize = 24;
const SKILL_SEPARATOR: &str = " \u{2022} ";
const CONTACT_SEPARATOR: &str = " | ";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("DOCX packaging failed: {0}")]
    Docx(String),
}

/// Render a Markdown résumé to a DOCX document.
///
/// - first `# Name` line → centred name
/// - lines between the name and the first section → one `" | "` joined contact line
/// - `## Section` → Heading 1, upper-cased
/// - `### Role | Company` → Heading 2
/// - `- item` / `* item` → bullet paragraph, or a `" • "` joined line under Skills
/// - `**bold**` / `*italic*` → styled runs
/// - code fences are dropped
pub fn render(markdown: &str) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "heading 1", SECTION_HEADING_SIZE))
        .add_style(heading_style("Heading2", "heading 2", SUB_HEADING_SIZE));

    let mut writer = ResumeWriter::default();
    for line in markdown.lines() {
        writer.line(line);
    }
    for paragraph in writer.finish() {
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

#[derive(Default)]
struct ResumeWriter {
    paragraphs: Vec<Paragraph>,
    seen_name: bool,
    seen_section: bool,
    contact: Vec<String>,
    section: Option<Section>,
    skills: Vec<String>,
}

impl ResumeWriter {
    fn line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("```") {
            return;
        }

        if let Some((level, text)) = parse_header_line(trimmed) {
            self.header(level, text);
            return;
        }

        if self.seen_name && !self.seen_section {
            self.contact.push(trimmed.to_string());
            return;
        }

        if let Some(item) = bullet_text(trimmed) {
            if self.section == Some(Section::Skills) {
                self.skills.push(item.to_string());
            } else {
                self.paragraphs.push(bullet_paragraph(item));
            }
            return;
        }

        self.flush_skills();
        self.paragraphs.push(body_paragraph(trimmed));
    }

    fn header(&mut self, level: usize, text: &str) {
        if level == 1 && !self.seen_name && !self.seen_section {
            self.seen_name = true;
            self.paragraphs.push(name_paragraph(text));
            return;
        }

        self.flush_contact();
        self.flush_skills();
        self.seen_section = true;

        if level <= SECTION_LEVEL {
            self.section = Section::classify(text);
            self.paragraphs
                .push(heading_paragraph(&text.to_uppercase(), "Heading1"));
        } else {
            self.paragraphs.push(heading_paragraph(text, "Heading2"));
        }
    }

    fn flush_contact(&mut self) {
        if self.contact.is_empty() {
            return;
        }
        let joined = self.contact.join(CONTACT_SEPARATOR);
        self.contact.clear();
        let mut para = Paragraph::new().align(AlignmentType::Center);
        for run in inline_runs(&joined) {
            para = para.add_run(run);
        }
        self.paragraphs.push(para);
    }

    fn flush_skills(&mut self) {
        if self.skills.is_empty() {
            return;
        }
        let joined = self.skills.join(SKILL_SEPARATOR);
        self.skills.clear();
        self.paragraphs.push(body_paragraph(&joined));
    }

    fn finish(mut self) -> Vec<Paragraph> {
        self.flush_contact();
        self.flush_skills();
        self.paragraphs
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

fn heading_style(style_id: &str, name: &str, size: usize) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size)
        .bold()
}

fn name_paragraph(text: &str) -> Paragraph {
    Paragraph::new().align(AlignmentType::Center).add_run(
        body_run(&strip_markers(text))
            .bold()
            .size(NAME_SIZE),
    )
}

fn heading_paragraph(text: &str, style_id: &str) -> Paragraph {
    Paragraph::new()
        .style(style_id)
        .add_run(body_run(&strip_markers(text)))
}

fn bullet_paragraph(text: &str) -> Paragraph {
    let mut para = Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(body_run("\u{2022} "));
    for run in inline_runs(text) {
        para = para.add_run(run);
    }
    para
}

fn body_paragraph(text: &str) -> Paragraph {
    let mut para = Paragraph::new().align(AlignmentType::Left);
    for run in inline_runs(text) {
        para = para.add_run(run);
    }
    para
}

fn body_run(text: &str) -> Run {
    Run::new()
        .add_text(text)
        .size(BODY_SIZE)
        .fonts(RunFonts::new().ascii(BODY_FONT))
}

fn strip_markers(text: &str) -> String {
    text.replace('*', "")
}

fn inline_runs(text: &str) -> Vec<Run> {
    inline_spans(text)
        .into_iter()
        .map(|span| {
            let mut run = body_run(span.text);
            if span.bold {
                run = run.bold();
            }
            if span.italic {
                run = run.italic();
            }
            run
        })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
struct Span<'a> {
    text: &'a str,
    bold: bool,
    italic: bool,
}

/// Split on `**` for bold, then on `*` for italic. Unbalanced markers simply
/// toggle, so the worst case is mis-styled text, never lost text.
fn inline_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    for (i, part) in text.split("**").enumerate() {
        for (j, piece) in part.split('*').enumerate() {
            if !piece.is_empty() {
                spans.push(Span {
                    text: piece,
                    bold: i % 2 == 1,
                    italic: j % 2 == 1,
                });
            }
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "```markdown
# Jane Doe
jane@example.com
(555) 123-4567

## Core Competencies
- Rust
- Go

## Work Experience
### **Engineer** | Acme
- Cut latency **40%** with *careful* profiling
```";

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            inline_spans("Cut **40%** of *waste*"),
            vec![
                Span { text: "Cut ", bold: false, italic: false },
                Span { text: "40%", bold: true, italic: false },
                Span { text: " of ", bold: false, italic: false },
                Span { text: "waste", bold: false, italic: true },
            ]
        );
    }

    #[test]
    fn test_unbalanced_markers_keep_text() {
        let spans = inline_spans("a **b");
        let text: String = spans.iter().map(|s| s.text).collect();
        assert_eq!(text, "a b");
    }

    #[test]
    fn test_writer_groups_contact_and_skills() {
        let mut writer = ResumeWriter::default();
        for line in RESUME.lines() {
            writer.line(line);
        }
        assert_eq!(writer.contact, Vec::<String>::new());
        // name, contact, heading, skills, heading, sub-heading, bullet
        assert_eq!(writer.finish().len(), 7);
    }

    #[test]
    fn test_contact_lines_collected_until_first_section() {
        let mut writer = ResumeWriter::default();
        for line in ["# Jane Doe", "jane@example.com", "Austin, TX"] {
            writer.line(line);
        }
        assert_eq!(writer.contact, vec!["jane@example.com", "Austin, TX"]);
    }

    #[test]
    fn test_render_produces_zip_package() {
        let bytes = render(RESUME).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_tolerates_empty_input() {
        assert!(render("").is_ok());
    }
}
