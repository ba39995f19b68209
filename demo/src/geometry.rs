use sqlext::{
    CodecConfig, FmtExt, Geometry, Result,
    geometry::{self, Circle, GeoBox, Path, Polygon},
};

pub fn convert(kind: &str, text: &str, config: &CodecConfig) -> Result<()> {
    let order = config.byte_order;

    let wkb = match kind {
        "wkt" => geometry::wkt_to_wkb(text, order)?,
        "point" => geometry::point_to_wkb(text, order)?,
        "lseg" => geometry::line_segment_to_wkb(text, order)?,
        "path" => {
            let path = Path::parse(text)?;
            println!("path:     {path}");
            path.to_wkb(order)?
        },
        "polygon" => {
            println!("polygon:  {}", Polygon::parse(text)?.to_pg_text()?);
            geometry::polygon_to_wkb(text, order)?
        },
        "circle" => {
            let circle = Circle::parse(text)?;
            println!("circle:   {circle}");
            return Ok(());
        },
        "box" => {
            let geo_box = GeoBox::parse(text)?;
            println!("box:      {geo_box}");
            return Ok(());
        },
        _ => unreachable!("kind checked by caller"),
    };

    let (ty, byte_order) = geometry::resolve_type(&wkb, 0)?;
    println!("type:     {} ({byte_order:?})", ty.tag());
    println!("wkb:      {}", wkb.hex());
    println!("wkt:      {}", geometry::wkb_to_wkt(&wkb)?);
    println!("mysql:    {}", Geometry::from_wkb(&wkb)?.to_mysql(0)?.hex());

    Ok(())
}

pub fn samples(config: &CodecConfig) -> Result<()> {
    for (kind, text) in [
        ("point", "(1,2)"),
        ("lseg", "[(0,0),(1,1)]"),
        ("path", "((0,0),(1,1),(2,0))"),
        ("polygon", "((0,0),(1,0),(1,1),(0,0))"),
        ("circle", "<(1,1),2>"),
        ("box", "(0,0),(1,1)"),
        ("wkt", "GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1))"),
    ] {
        let _s = tracing::trace_span!("geometry", kind, text).entered();
        convert(kind, text, config)?;
        println!();
    }
    Ok(())
}
