//! Benchmarks for the split pipeline.
//!
//! Run with: cargo bench

use std::io::{Cursor, Write};

use criterion::{Criterion, criterion_group, criterion_main};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use quire::{BuildContext, EpubWriter, LenientExtractor, PackageBuilder, SourceArchive};
use quire::{FragmentExtractor, fixed_batches};

const CHAPTERS: usize = 300;

/// Build an in-memory source EPUB with `CHAPTERS` chapters and a cover.
fn synthetic_epub() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("mimetype", options).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    zip.start_file("OEBPS/Images/cover.jpg", options).unwrap();
    zip.write_all(&[0xFF; 4096]).unwrap();

    let paragraph = "<p>The road wound on through the hills, and the rain kept falling.</p>\n";
    for i in 1..=CHAPTERS {
        zip.start_file(format!("OEBPS/Text/{i:04}-chapter-{i}.xhtml"), options)
            .unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
             <head><title>Chapter {i}</title></head>\n<body>\n<h1>Chapter {i}</h1>\n{}</body>\n</html>\n",
            paragraph.repeat(40)
        )
        .unwrap();
    }

    zip.finish().unwrap().into_inner()
}

// ============================================================================
// Import Benchmarks
// ============================================================================

fn bench_read_book(c: &mut Criterion) {
    let bytes = synthetic_epub();
    c.bench_function("read_book", |b| {
        b.iter(|| {
            SourceArchive::from_reader(Cursor::new(bytes.as_slice()))
                .unwrap()
                .read_book()
                .unwrap()
        });
    });
}

fn bench_extract_fragment(c: &mut Criterion) {
    let html = format!(
        "<html><head><title>t</title></head><body class=\"main\">{}</body></html>",
        "<p>Some text &amp; more.</p>".repeat(2000)
    );
    c.bench_function("extract_fragment", |b| {
        b.iter(|| LenientExtractor.extract(&html).len());
    });
}

// ============================================================================
// Export Benchmarks
// ============================================================================

fn bench_build_and_write(c: &mut Criterion) {
    let bytes = synthetic_epub();
    let book = SourceArchive::from_reader(Cursor::new(bytes))
        .unwrap()
        .read_book()
        .unwrap();
    let builder = PackageBuilder::new(BuildContext::new("bench").with_cover(book.cover.as_ref()));
    let batches = fixed_batches(&book.chapters, 100).unwrap();

    c.bench_function("build_packages", |b| {
        b.iter(|| {
            batches
                .iter()
                .enumerate()
                .map(|(i, batch)| builder.build(*batch, i + 1).opf.len())
                .sum::<usize>()
        });
    });

    c.bench_function("write_packages", |b| {
        let writer = EpubWriter::new();
        b.iter(|| {
            for (i, batch) in batches.iter().enumerate() {
                let package = builder.build(*batch, i + 1);
                let mut out = Cursor::new(Vec::new());
                writer.write(&package, &mut out).unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_read_book,
    bench_extract_fragment,
    bench_build_and_write
);
criterion_main!(benches);
