use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cyclenotes_compiler_html::{export_static, parse_fragment, ExportOptions, ExportOutcome, Hydrator};
use cyclenotes_document::{serialize, Document, ListType, Node, Poll, PollOption};

fn service_log(blocks: usize) -> String {
    let mut nodes = Vec::new();
    for i in 0..blocks {
        nodes.push(Node::paragraph(vec![
            Node::text(format!("Visit {}: adjusted derailleur for ", i)),
            Node::mention("Rosa"),
            Node::text(" "),
            Node::hashtag("drivetrain"),
            Node::text(" on "),
            Node::datetime("2024-06-01 10:30"),
        ]));
        nodes.push(Node::list(
            ListType::Check,
            vec![
                Node::checklist_item(true, vec![Node::text("Clean chain")]),
                Node::checklist_item(false, vec![Node::text("Replace cable")]),
            ],
        ));
    }
    nodes.push(Node::poll(Poll::new(
        "Offer winter tune-ups?",
        vec![PollOption::new("y", "Yes"), PollOption::new("n", "No")],
    )));

    serialize(&Document::from_nodes(nodes)).unwrap()
}

fn export_small_note(c: &mut Criterion) {
    let json = service_log(1);
    let options = ExportOptions::default();

    c.bench_function("export_small_note", |b| {
        b.iter(|| export_static(black_box(&json), &options))
    });
}

fn export_large_note(c: &mut Criterion) {
    let json = service_log(200);
    let options = ExportOptions::default();

    c.bench_function("export_large_note", |b| {
        b.iter(|| export_static(black_box(&json), &options))
    });
}

fn hydrate_exported_html(c: &mut Criterion) {
    let json = service_log(50);
    let html = match export_static(&json, &ExportOptions::default()) {
        ExportOutcome::Exported(export) => export.html,
        ExportOutcome::Fallback(fallback) => panic!("export failed: {}", fallback.error),
    };

    c.bench_function("hydrate_exported_html", |b| {
        b.iter(|| {
            let mut nodes = parse_fragment(black_box(&html));
            Hydrator::new().hydrate(&mut nodes)
        })
    });
}

criterion_group!(
    benches,
    export_small_note,
    export_large_note,
    hydrate_exported_html
);
criterion_main!(benches);
