#![allow(dead_code)]

use std::{
    panic::{UnwindSafe, catch_unwind},
    sync::Once,
};

use mathbox::{
    Atom, Branch, Context, LayoutError, LayoutSettings, MathBox, atom::adopt, decompose,
    style::DISPLAY,
};

static LOGGER: Once = Once::new();

/// Route `log` output through `env_logger`, once per test binary.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(feature = "backtrace")]
fn format_backtrace(err: &LayoutError) -> String {
    let Ok(backtrace) = btparse::deserialize(&err.backtrace) else {
        return "<unparsable backtrace>".to_owned();
    };
    let mut traces = Vec::new();
    for frame in backtrace.frames {
        let function = frame.function;
        if function.starts_with("mathbox::types::layout_error::LayoutError")
            || function.starts_with("core::ops::function::FnOnce")
        {
            continue;
        }
        if function.starts_with("std::panicking") {
            break;
        }
        let loc = match (frame.file, frame.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file,
            _ => "<unknown>".to_owned(),
        };
        traces.push(format!("at {function} ({loc})"));
    }
    traces.join("\n")
}

#[cfg(not(feature = "backtrace"))]
fn format_backtrace(_err: &LayoutError) -> String {
    "<enable the `backtrace` feature>".to_owned()
}

/// One case of a `describe` block.
pub fn it<F>(desc: &str, test_fn: F)
where
    F: FnOnce() -> Result<(), LayoutError> + UnwindSafe,
{
    init_logger();
    match catch_unwind(test_fn) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            panic!(
                "Test '{desc}' failed with Result::Err: {err}\nBacktrace:\n{}",
                format_backtrace(&err)
            );
        }
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_owned()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "<non-string panic payload>".to_owned()
            };
            panic!("Test '{desc}' panicked: {msg}");
        }
    }
}

pub fn text_ctx() -> Context {
    Context::from_settings(&LayoutSettings::default())
}

pub fn display_ctx() -> Context {
    Context::builder().mathstyle(DISPLAY).build()
}

/// Lay out `atom` as the only element of a root list and return its box.
pub fn layout_one(ctx: &Context, atom: Atom) -> Result<MathBox, LayoutError> {
    let atoms = adopt(vec![atom], Branch::Body);
    let mut boxes = decompose(ctx, &atoms)?.ok_or_else(|| LayoutError::new("no output"))?;
    Ok(boxes.remove(1))
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

macro_rules! assert_let {
    ($pat:pat = $expr:expr) => {
        let $pat = $expr else {
            panic!(
                "assert_let failed: pattern `{}` did not match {} at {}:{}",
                stringify!($pat),
                stringify!($expr),
                file!(),
                line!(),
            );
        };
    };
}
pub(crate) use assert_let;
