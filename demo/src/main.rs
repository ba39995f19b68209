use tracing::trace_span;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use sqlext::{CodecConfig, Result};

mod interval;
mod geometry;

const USAGE: &str = "\
usage: demo [<kind> <text>]

kind:
  interval  ISO-8601 interval, `P1DT2H`
  wkt       Well-Known-Text, `POINT(1 2)`
  point     `(x,y)`
  lseg      `[(x1,y1),(x2,y2)]`
  path      `[(x1,y1),...]` or `((x1,y1),...)`
  polygon   `((x1,y1),...)`
  circle    `<(x,y),r>`
  box       `(x1,y1),(x2,y2)`

without argument, run all samples";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::Registry::default()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = CodecConfig::from_env();
    tracing::debug!(?config);

    let mut args = std::env::args().skip(1);

    let (Some(kind), Some(text)) = (args.next(), args.next()) else {
        let _s = trace_span!("samples").entered();
        interval::samples(&config)?;
        geometry::samples(&config)?;
        return Ok(());
    };

    match kind.as_str() {
        "interval" => interval::convert(&text, &config),
        "wkt" | "point" | "lseg" | "path" | "polygon" | "circle" | "box" => {
            geometry::convert(&kind, &text, &config)
        },
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2)
        },
    }
}
