use std::env;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

use contigmap::canonical::Registry;
use flate2::read::GzDecoder;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::Alignment;
use tabled::settings::Style;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let src = env::args().nth(1).expect("missing src");

    let contig_ids: Vec<u64> = env::args()
        .skip(2)
        .map(|s| {
            s.parse::<u64>()
                .unwrap_or_else(|_| panic!("could not parse contig id: {s}"))
        })
        .collect();

    let file = File::open(&src)?;
    let inner: Box<dyn BufRead> = if src.ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut reader = contigmap::Reader::new(inner);
    let registry = Registry::default();

    let mut builder = Builder::default();
    builder.push_record([
        "Placement", "--", "-->", "Contig", "--", "-->", "Read", "--", "-->", "Shape",
    ]);
    builder.push_record([
        "Contig", "Read", "Direction", "Start", "End", "Pads", "Start", "End", "Blocks",
        "Canonical",
    ]);

    for result in reader.groups() {
        let group = result?;

        if !contig_ids.is_empty() && !contig_ids.contains(&group.contig_id()) {
            continue;
        }

        let mapping = group.into_mapping()?.to_canonical(&registry);

        let reference = mapping.reference_range();
        let subject = mapping.subject_range();
        let pads = reference.length() - subject.length();

        builder.push_record([
            mapping.reference_id().to_string(),
            mapping.subject_id().to_string(),
            mapping.direction().to_string(),
            reference.start().to_string(),
            reference.end().to_string(),
            pads.to_string(),
            subject.start().to_string(),
            subject.end().to_string(),
            mapping.segments().len().to_string(),
            mapping.is_canonical().to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string();

    println!("{}", table);
    println!(
        "{} distinct shapes, {} reused",
        registry.len(),
        registry.counts().hits
    );

    Ok(())
}
