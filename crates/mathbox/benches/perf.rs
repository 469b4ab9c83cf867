use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mathbox::atom::{Limits, adopt};
use mathbox::{Atom, Branch, LayoutSettings, render_to_string};
use serde::Deserialize;

const TESTS_TO_RUN: [&str; 5] = [
    "NestedFractions",
    "ScriptedSum",
    "Radicals",
    "Delimited",
    "Matrix",
];

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Shape {
    Fractions,
    Scripts,
    Radicals,
    Delimiters,
    Matrix,
}

#[derive(Debug, Deserialize)]
struct RawTestCase {
    shape: Shape,
    size: usize,
    #[serde(default)]
    display: bool,
}

struct PreparedCase {
    name: &'static str,
    atoms: Arc<Vec<Atom>>,
    settings: Arc<LayoutSettings>,
}

fn letter(i: usize) -> Atom {
    let letters = ['a', 'b', 'x', 'y', 'n', 'k'];
    Atom::ord(letters[i % letters.len()].to_string())
}

fn nested_fraction(depth: usize) -> Atom {
    if depth == 0 {
        return letter(depth);
    }
    Atom::frac(
        vec![letter(depth), Atom::bin("+"), nested_fraction(depth - 1)],
        vec![letter(depth + 1).with_sup(vec![Atom::ord("2")])],
    )
}

fn build_atoms(shape: Shape, size: usize) -> Vec<Atom> {
    let atoms = match shape {
        Shape::Fractions => vec![nested_fraction(size)],
        Shape::Scripts => {
            let mut atoms = vec![
                Atom::op_symbol("\u{2211}", Limits::Auto)
                    .with_sub(vec![Atom::ord("i"), Atom::rel("="), Atom::ord("1")])
                    .with_sup(vec![Atom::ord("n")]),
            ];
            for i in 0..size {
                if i > 0 {
                    atoms.push(Atom::bin("+"));
                }
                atoms.push(
                    letter(i)
                        .with_sub(vec![Atom::ord("i")])
                        .with_sup(vec![Atom::ord(i.to_string())]),
                );
            }
            atoms
        }
        Shape::Radicals => (0..size)
            .fold(vec![Atom::ord("x")], |body, i| {
                let index = (i % 2 == 0).then(|| vec![Atom::ord("3")]);
                vec![Atom::surd(body, index)]
            }),
        Shape::Delimiters => (0..size).fold(vec![nested_fraction(1)], |body, _| {
            vec![Atom::leftright(Some("("), body, Some(")"))]
        }),
        Shape::Matrix => {
            let rows = (0..size)
                .map(|r| (0..size).map(|c| vec![letter(r + c)]).collect())
                .collect();
            vec![Atom::matrix(rows, Some("["), Some("]"))]
        }
    };
    adopt(atoms, Branch::Body)
}

fn load_cases() -> Result<Vec<PreparedCase>, Box<dyn Error>> {
    let file = File::open(dataset_path())?;
    let reader = BufReader::new(file);
    let mut raw_cases: HashMap<String, RawTestCase> = serde_yaml::from_reader(reader)?;

    TESTS_TO_RUN
        .iter()
        .map(|&name| -> Result<PreparedCase, Box<dyn Error>> {
            let case = raw_cases.remove(name).ok_or_else(|| {
                std::io::Error::other(format!("missing test case '{name}' in cases.yaml"))
            })?;
            Ok(PreparedCase {
                name,
                atoms: Arc::new(build_atoms(case.shape, case.size)),
                settings: Arc::new(
                    LayoutSettings::builder()
                        .display_mode(case.display)
                        .build(),
                ),
            })
        })
        .collect()
}

fn dataset_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("benches/cases.yaml")
}

fn bench_layout(c: &mut Criterion) {
    let cases = load_cases().expect("failed to load benchmark cases");

    let mut group = c.benchmark_group("mathbox_layout");
    for PreparedCase {
        name,
        atoms,
        settings,
    } in cases
    {
        // Ensure layout succeeds once before measuring performance.
        render_to_string(&atoms, &settings).expect("layout failed while priming benchmark");

        group.bench_function(name, move |b| {
            b.iter(|| {
                let rendered = render_to_string(black_box(&atoms), &settings)
                    .expect("layout failed during benchmark");
                black_box(rendered.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
