/// Shortest run of blank lines treated as a removal artifact.
const COLLAPSE_THRESHOLD: usize = 3;

/// Collapses every run of three or more blank lines to a single blank line.
///
/// A line is blank when it holds nothing but spaces, tabs and carriage
/// returns. Shorter runs, non-blank lines and line terminators pass through
/// untouched.
pub fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run: Vec<&str> = Vec::new();

    for line in text.split_inclusive('\n') {
        if is_blank(line) {
            run.push(line);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push_str(line);
    }
    flush_run(&mut out, &mut run);

    out
}

fn flush_run(out: &mut String, run: &mut Vec<&str>) {
    if run.len() >= COLLAPSE_THRESHOLD {
        out.push_str(run[0]);
    } else {
        for line in run.iter() {
            out.push_str(line);
        }
    }
    run.clear();
}

fn is_blank(line: &str) -> bool {
    let content = line.strip_suffix('\n').unwrap_or(line);
    content.chars().all(|c| matches!(c, ' ' | '\t' | '\r'))
}
