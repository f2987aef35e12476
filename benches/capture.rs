//! Capture pipeline benchmark suite.
//!
//! Captures a synthetic page in every mode at growing sizes:
//! - Row counts: 50, 200, 800 (each row holds a link, a button and text)
//!
//! Run with: cargo bench --bench capture
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tabpilot::capture::DEFAULT_CAPTURE_LIMIT;
use tabpilot::{CaptureMode, StaticPage, capture};
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const ROW_COUNTS: &[usize] = &[50, 200, 800];

const MODES: &[CaptureMode] = &[
    CaptureMode::Snapshot,
    CaptureMode::FullHtml,
    CaptureMode::Markdown,
    CaptureMode::Text,
];

// ============================================================================
// Fixture
// ============================================================================

fn synthetic_page(rows: usize) -> String {
    let mut html = String::from(
        "<body><script>analytics()</script><style>.x{}</style><nav><a href=\"/\">Home</a></nav><main>",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<div class=\"row r{i}\"><div><span>Item {i}</span>\
             <a href=\"/items/{i}\" class=\"link\">Details</a>\
             <button class=\"btn\" onclick=\"buy({i})\">Buy</button>\
             <!-- row {i} --><p>Description of item {i} with some filler text.</p></div></div>"
        ));
    }
    html.push_str("</main></body>");
    html
}

// ============================================================================
// Benchmark: Capture Modes
// ============================================================================

fn bench_capture(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("capture");
    group.sample_size(20);

    for &rows in ROW_COUNTS {
        let html = synthetic_page(rows);
        group.throughput(Throughput::Bytes(html.len() as u64));

        for &mode in MODES {
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), rows),
                &html,
                |b, html| {
                    b.to_async(&rt).iter(|| async {
                        // Snapshot tags the live page, so each run gets a fresh one.
                        let page = StaticPage::from_html(html);
                        capture(&page, mode, DEFAULT_CAPTURE_LIMIT).await
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_capture);
criterion_main!(benches);
