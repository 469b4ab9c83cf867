use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SIGMAS_PATH: &str = "data/sigmas_and_xis.json";
const GLYPHS_PATH: &str = "data/font_metrics_data.json";

#[derive(serde::Deserialize)]
struct SigmasAndXis {
    #[serde(rename = "sigmasAndXis")]
    values: BTreeMap<String, [f64; 3]>,
    #[serde(rename = "fieldDocs", default)]
    docs: BTreeMap<String, String>,
}

/// Font family -> char code (decimal string) -> `[depth, height, italic, skew, width]`
type GlyphTable = BTreeMap<String, BTreeMap<String, [f64; 5]>>;

fn main() {
    println!("cargo:rerun-if-changed={SIGMAS_PATH}");
    println!("cargo:rerun-if-changed={GLYPHS_PATH}");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");

    let sigmas = fs::read_to_string(SIGMAS_PATH).expect("failed to read sigmas_and_xis.json");
    let sigmas: SigmasAndXis =
        serde_json::from_str(&sigmas).expect("failed to parse sigmas_and_xis.json");
    write_output(&out_dir, "sigmas_and_xis.rs", &generate_sigmas(&sigmas));

    let glyphs = fs::read_to_string(GLYPHS_PATH).expect("failed to read font_metrics_data.json");
    let glyphs: GlyphTable =
        serde_json::from_str(&glyphs).expect("failed to parse font_metrics_data.json");
    write_output(&out_dir, "glyph_metrics.rs", &generate_glyphs(&glyphs));
}

fn write_output(out_dir: &str, name: &str, code: &str) {
    let dest = Path::new(out_dir).join(name);
    fs::write(&dest, code).unwrap_or_else(|err| panic!("failed to write {name}: {err}"));
}

fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, ch) in camel.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn float_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn generate_sigmas(data: &SigmasAndXis) -> String {
    let mut code = String::from(
        "// Generated by build.rs from data/sigmas_and_xis.json\n\n\
         /// Layout constants for one font size class (text, script, scriptscript).\n\
         #[derive(Debug, Clone, PartialEq)]\n\
         pub struct FontMetrics {\n",
    );

    for key in data.values.keys() {
        if let Some(doc) = data.docs.get(key) {
            let _ = writeln!(code, "    /// {doc}");
        }
        let _ = writeln!(code, "    pub {}: f64,", snake_case(key));
    }
    code.push_str("    /// Size of one math unit (1/18 quad) in ems\n    pub css_em_per_mu: f64,\n}\n\n");

    code.push_str(
        "/// Constants indexed by size class: 0 = text, 1 = script, 2 = scriptscript.\n\
         pub const FONT_METRICS: [FontMetrics; 3] = [\n",
    );
    for index in 0..3 {
        code.push_str("    FontMetrics {\n");
        for (key, values) in &data.values {
            let _ = writeln!(
                code,
                "        {}: {},",
                snake_case(key),
                float_literal(values[index])
            );
        }
        let quad = data.values.get("quad").map_or(1.0, |q| q[index]);
        let _ = writeln!(code, "        css_em_per_mu: {},", float_literal(quad / 18.0));
        code.push_str("    },\n");
    }
    code.push_str("];\n");
    code
}

fn generate_glyphs(table: &GlyphTable) -> String {
    let mut code = String::from("// Generated by build.rs from data/font_metrics_data.json\n\n");
    let mut index = phf_codegen::Map::new();

    for (family, glyphs) in table {
        let ident = format!("{}_GLYPHS", family.replace(['-', '.'], "_").to_uppercase());
        index.entry(family.as_str(), &format!("&{ident}"));

        let mut map = phf_codegen::Map::new();
        for (code_point, metrics) in glyphs {
            let code_point: u32 = code_point
                .parse()
                .unwrap_or_else(|_| panic!("bad char code {code_point} in {family}"));
            let fields = metrics
                .iter()
                .map(|v| float_literal(*v))
                .collect::<Vec<_>>()
                .join(", ");
            map.entry(code_point, &format!("CharacterMetrics::new({fields})"));
        }

        let _ = writeln!(
            code,
            "/// Glyph metrics for {family}\nstatic {ident}: phf::Map<u32, CharacterMetrics> = {};\n",
            map.build()
        );
    }

    let _ = writeln!(
        code,
        "/// Font family name to glyph metric table\n\
         pub static GLYPH_METRICS: phf::Map<&'static str, &'static phf::Map<u32, CharacterMetrics>> = {};",
        index.build()
    );
    code
}
