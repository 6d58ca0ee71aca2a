use std::time::{Duration, Instant};

use gem_tui::document::Document;
use gem_tui::editor::EditSession;
use gem_tui::render::render_session;
use gem_tui::theme::Theme;

/// Performance benchmark suite for gem-tui document operations
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Document construction from source lines
/// - Split/merge edit cycles
/// - Session rendering
const SMALL_DOC_LINES: usize = 10;
const MEDIUM_DOC_LINES: usize = 100;
const LARGE_DOC_LINES: usize = 1000;
const HUGE_DOC_LINES: usize = 10000;

const ITERATIONS: usize = 100;

fn create_source_lines(count: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(count);
    for i in 0..count {
        match i % 6 {
            0 => lines.push(format!("# Section {i}")),
            1 => lines.push(format!("A plain paragraph with some words, number {i}.")),
            2 => lines.push(format!("* item {i}")),
            3 => lines.push(format!("> quoted line {i}")),
            4 => lines.push(format!("=> gemini://example.org/{i} link {i}")),
            _ => lines.push(String::new()),
        }
    }
    lines
}

fn measure<F: FnMut()>(mut op: F) -> Duration {
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        op();
    }
    start.elapsed() / ITERATIONS as u32
}

fn report(name: &str, per_iteration: Duration) {
    println!("{name:<40} {per_iteration:>12.2?}");
}

#[test]
fn bench_document_build() {
    for (label, size) in [
        ("build/small", SMALL_DOC_LINES),
        ("build/medium", MEDIUM_DOC_LINES),
        ("build/large", LARGE_DOC_LINES),
        ("build/huge", HUGE_DOC_LINES),
    ] {
        let source = create_source_lines(size);
        let elapsed = measure(|| {
            let document = Document::build(&source);
            std::hint::black_box(document.line_count());
        });
        report(label, elapsed);
    }
}

#[test]
fn bench_split_merge_cycle() {
    for (label, size) in [
        ("split_merge/medium", MEDIUM_DOC_LINES),
        ("split_merge/large", LARGE_DOC_LINES),
    ] {
        let source = create_source_lines(size);
        let mut document = Document::build(&source);
        let target = document.first().expect("non-empty document");
        let elapsed = measure(|| {
            let requests = document.split_at(target, 3).expect("split");
            let new_line = requests[1].line;
            document.merge_with_previous(new_line).expect("merge");
        });
        assert!(document.check_links());
        report(label, elapsed);
    }
}

#[test]
fn bench_render() {
    let theme = Theme::new();
    for (label, size) in [
        ("render/medium", MEDIUM_DOC_LINES),
        ("render/large", LARGE_DOC_LINES),
    ] {
        let source = create_source_lines(size);
        let session = EditSession::new(Document::build(&source));
        let elapsed = measure(|| {
            let result = render_session(&session, 80, &theme);
            std::hint::black_box(result.total_lines);
        });
        report(label, elapsed);
    }
}
