use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rtfmark::preview::{PreviewOptions, Previewer};

fn build_document(sections: usize) -> String {
    let mut doc = String::new();
    for i in 0..sections {
        doc.push_str(&format!(
            "## Section {i}\n\n\
             Some *emphasis*, **strong** text, ~~struck~~ words and www.example.com/{i}.\n\n\
             - [x] done {i}\n- [ ] todo {i}\n\n\
             | name | value |\n| :-- | --: |\n| row {i} | {i} |\n\n\
             <script>alert({i})</script>\n\n"
        ));
    }
    doc
}

fn bench_render(c: &mut Criterion) {
    let previewer = Previewer::default();
    let mut group = c.benchmark_group("preview_render");

    for sections in [10usize, 100, 1_000] {
        let doc = build_document(sections);
        for extras in [false, true] {
            let options = PreviewOptions {
                enable_gfm_extras: extras,
            };
            let id = BenchmarkId::new(if extras { "extras" } else { "plain" }, sections);
            group.bench_with_input(id, &doc, |b, doc| {
                b.iter(|| black_box(previewer.render(black_box(doc), options)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
