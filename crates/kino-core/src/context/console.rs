//! User-facing progress output: action records and script messages.
//!
//! stdout carries progress, stderr carries `log_error`. Each line is also
//! mirrored to `tracing` so the log file shows what a run did.

/// Print an action record such as `   write src/App.java`.
pub fn action(verb: &str, subject: &str) {
    println!("{:>8} {}", verb, subject);
    tracing::info!(verb, subject, "action");
}

pub fn info(msg: &str) {
    println!("{}", msg);
    tracing::info!(target: "kino::script", "{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("{}", msg);
    tracing::error!(target: "kino::script", "{}", msg);
}

/// Substitute `{}` (next argument) and `{N}` (argument N) in `template`.
/// `{{` and `}}` produce literal braces; unmatched placeholders are kept.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut spec = String::new();
                let mut closed = false;
                for d in chars.by_ref() {
                    if d == '}' {
                        closed = true;
                        break;
                    }
                    spec.push(d);
                }
                let index = if spec.is_empty() {
                    let i = next;
                    next += 1;
                    Some(i)
                } else {
                    spec.parse::<usize>().ok()
                };
                match index.and_then(|i| args.get(i)) {
                    Some(arg) if closed => out.push_str(arg),
                    _ => {
                        out.push('{');
                        out.push_str(&spec);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn sequential_placeholders() {
        assert_eq!(
            format_message("{} files in {}", &s(&["3", "src"])),
            "3 files in src"
        );
    }

    #[test]
    fn indexed_placeholders_and_escapes() {
        assert_eq!(format_message("{1}-{0} {{x}}", &s(&["a", "b"])), "b-a {x}");
    }

    #[test]
    fn missing_argument_left_verbatim() {
        assert_eq!(format_message("run '{}' {}", &s(&["gradle"])), "run 'gradle' {}");
        assert_eq!(format_message("open {", &s(&[])), "open {");
    }
}
