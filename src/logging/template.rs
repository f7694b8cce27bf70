//! Runtime message templates.
//!
//! Templates use `{}` placeholders filled positionally; `{{` and `}}` are
//! literal braces. Unlike `format!`, the argument count is only known at run
//! time, so a mismatch is possible and must be absorbed here.

use std::fmt::{Display, Write};

use crate::logging::error::LoggingError;

/// Render `template` with `args`, failing when the counts disagree.
pub fn render(template: &str, args: &[&dyn Display]) -> Result<String, LoggingError> {
    let expected = count_placeholders(template);
    if expected != args.len() {
        return Err(LoggingError::TemplateRender {
            expected,
            supplied: args.len(),
        });
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                out.push(c);
            }
            ('{', Some('}')) => {
                chars.next();
                if let Some(arg) = args.next() {
                    let _ = write!(out, "{}", arg);
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Render `template`, degrading to the raw template plus a failure marker.
pub fn render_lossy(template: &str, args: &[&dyn Display]) -> String {
    match render(template, args) {
        Ok(message) => message,
        Err(e) => format!("{} [template error: {}]", template, e),
    }
}

fn count_placeholders(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
            }
            ('{', Some('}')) => {
                chars.next();
                count += 1;
            }
            _ => {}
        }
    }
    count
}
