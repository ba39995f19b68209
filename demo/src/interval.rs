use sqlext::{
    CodecConfig, FmtExt, Interval, Result,
    postgres::{Decode, Encode},
};

pub fn convert(text: &str, config: &CodecConfig) -> Result<()> {
    let interval = Interval::parse(text, config.precision)
        .map_err(|e| e.context(format!("parsing interval {text:?}")))?;

    println!("text:     {}", interval.format(config.precision));
    println!("seconds:  {}", interval.seconds());
    println!("nanos:    {}", interval.nanos());

    match interval.encode() {
        Ok(encoded) => {
            println!("postgres: {}", encoded.value().hex());
            assert_eq!(Interval::decode(encoded.oid(), encoded.value())?, interval);
        },
        Err(err) => println!("postgres: {err}"),
    }

    if let Ok(duration) = time::Duration::try_from(interval) {
        println!("duration: {duration}");
    }

    Ok(())
}

pub fn samples(config: &CodecConfig) -> Result<()> {
    for text in ["PT0S", "P1Y2M3DT4H5M6.5S", "-PT1M30.25S", "PT1M-0.5S", "P-1DT0.000001S"] {
        let _s = tracing::trace_span!("interval", text).entered();
        convert(text, config)?;
        println!();
    }
    Ok(())
}
