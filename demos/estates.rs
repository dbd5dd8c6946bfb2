use clap::Parser;
use estate_perimeter::tiles::{estate_records, parse_tiles};
use estate_perimeter::{group_records, EstateExporter, FeatureKind, GridConfig};
use geojson::GeoJson;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tiles API response (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for estatesPerimeter.json / estatesArea.json
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Inset of perimeter edges, in pixels
    #[arg(long, default_value_t = 1)]
    margin: i64,

    /// Export perimeters on the cell grid instead of inset
    #[arg(long, default_value_t = false)]
    no_offset: bool,

    /// Merge estates even when their parcels are not edge-connected
    #[arg(long, default_value_t = false)]
    no_connectivity_check: bool,

    /// Also write merged outlines (estatesOutline.json)
    #[arg(long, default_value_t = false)]
    outline: bool,
}

fn write_collection(
    path: PathBuf,
    collection: geojson::FeatureCollection,
) -> Result<(), Box<dyn std::error::Error>> {
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(writer, &GeoJson::FeatureCollection(collection))?;
    println!("Wrote {:?}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("Reading tiles from {:?}", args.input);
    let body = fs::read_to_string(&args.input)?;
    let records = parse_tiles(&body)?;
    let total = records.len();
    let estates = estate_records(records);
    let groups = group_records(&estates);
    println!(
        "{} tiles, {} within estates, {} estates",
        total,
        estates.len(),
        groups.len()
    );

    let exporter = EstateExporter::new(GridConfig::default())
        .with_margin(args.margin)
        .with_offset(!args.no_offset)
        .with_connectivity_check(!args.no_connectivity_check);

    fs::create_dir_all(&args.output)?;
    write_collection(
        args.output.join("estatesPerimeter.json"),
        exporter.export(&groups, FeatureKind::Perimeter)?,
    )?;
    write_collection(
        args.output.join("estatesArea.json"),
        exporter.export(&groups, FeatureKind::Area)?,
    )?;
    if args.outline {
        write_collection(
            args.output.join("estatesOutline.json"),
            exporter.export(&groups, FeatureKind::Outline)?,
        )?;
    }

    Ok(())
}
