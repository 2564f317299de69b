//! Tests de bout en bout: agrégation + écriture GeoJSON
//!
//! Les en-têtes sont fournis par un lecteur en mémoire, le fichier de
//! sortie est réellement écrit dans un dossier temporaire puis relu avec
//! le crate `geojson`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use geojson::GeoJson;
use las_bbox_qc::{
    pipeline, AggregateDataset, Aggregator, CrsPolicy, DatasetWriter, ExportError,
    GeoJsonDatasetWriter, HeaderReader, QcError, ReadFailurePolicy, WriteOutcome,
};
use lasmeta::{CrsDescriptor, CrsKind, CrsSource, HeaderRecord, LasMetaError, SubCrs, Triple};

/// Lecteur en mémoire: chemin → en-tête (absent = fichier corrompu)
#[derive(Default)]
struct MemoryReader {
    headers: HashMap<PathBuf, HeaderRecord>,
}

impl MemoryReader {
    fn with_tile(mut self, name: &str, extent: (f64, f64, f64, f64), epsg: Option<u32>) -> Self {
        let (minx, miny, maxx, maxy) = extent;
        let crs = match epsg {
            Some(code) => CrsDescriptor::from_parts(
                CrsSource::GeoTiff,
                vec![SubCrs::new(CrsKind::Projected, Some(code))],
            ),
            None => CrsDescriptor::empty(),
        };
        let header = HeaderRecord {
            filename: name.to_string(),
            mins: Triple::new(minx, miny, 100.0),
            maxs: Triple::new(maxx, maxy, 250.5),
            point_count: 1_000,
            point_format: 6,
            major_version: 1,
            minor_version: 4,
            creation_date: Some("2023-06-01".to_string()),
            file_source_id: 0,
            generating_software: "test".to_string(),
            crs,
        };
        self.headers.insert(PathBuf::from(name), header);
        self
    }
}

impl HeaderReader for MemoryReader {
    fn open_header(&self, path: &Path) -> Result<HeaderRecord, LasMetaError> {
        self.headers
            .get(path)
            .cloned()
            .ok_or_else(|| LasMetaError::invalid_header(path.display().to_string(), "corrupt"))
    }
}

/// Writer qui compte les appels sans rien écrire
#[derive(Default)]
struct CountingWriter {
    calls: AtomicUsize,
}

impl DatasetWriter for CountingWriter {
    fn write(&self, _dataset: &AggregateDataset, _destination: &Path) -> Result<(), ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Destination verrouillée par une autre application
struct LockedWriter;

impl DatasetWriter for LockedWriter {
    fn write(&self, _dataset: &AggregateDataset, destination: &Path) -> Result<(), ExportError> {
        Err(ExportError::PermissionDenied {
            path: destination.to_path_buf(),
        })
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("las-bbox-qc-e2e-{}-{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn three_tiles() -> MemoryReader {
    MemoryReader::default()
        .with_tile("a.las", (0.0, 0.0, 10.0, 10.0), Some(6933))
        .with_tile("b.laz", (5.0, 5.0, 15.0, 15.0), Some(6933))
        .with_tile("c.las", (-2.0, -2.0, 0.0, 0.0), Some(6933))
}

#[test]
fn test_three_files_written_as_geojson() {
    let dir = temp_dir("three");
    let output = dir.join("las_bbox_qc.geojson");
    let reader = three_tiles();
    let aggregator = Aggregator::new(&reader);

    let run = pipeline::run(
        &paths(&["a.las", "b.laz", "c.las"]),
        &output,
        &aggregator,
        &GeoJsonDatasetWriter,
    )
    .unwrap();

    assert_eq!(run.outcome, WriteOutcome::Written(output.clone()));
    assert_eq!(run.dataset.crs_identifier().as_deref(), Some("EPSG:6933"));

    let text = std::fs::read_to_string(&output).unwrap();
    let collection = match text.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => fc,
        other => panic!("Expected FeatureCollection, got {:?}", other),
    };

    assert_eq!(collection.features.len(), 3);
    let crs = &collection.foreign_members.as_ref().unwrap()["crs"];
    assert_eq!(crs["properties"]["name"], "urn:ogc:def:crs:EPSG::6933");

    let names: Vec<_> = collection
        .features
        .iter()
        .map(|f| f.property("filename").unwrap().as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a.las", "b.laz", "c.las"]);

    let first = &collection.features[0];
    assert_eq!(first.property("crs").unwrap(), "6933");
    assert_eq!(first.property("vdatum").unwrap(), "None");
    assert_eq!(*first.property("z_max").unwrap(), 250.5);

    match &first.geometry.as_ref().unwrap().value {
        geojson::Value::Polygon(rings) => {
            assert_eq!(rings.len(), 1);
            let ring = &rings[0];
            assert_eq!(ring.len(), 5);
            assert_eq!(ring[0], vec![10.0, 0.0]);
            assert_eq!(ring[1], vec![10.0, 10.0]);
            assert_eq!(ring[2], vec![0.0, 10.0]);
            assert_eq!(ring[3], vec![0.0, 0.0]);
            assert_eq!(ring[4], ring[0]);
        }
        other => panic!("Expected Polygon, got {:?}", other),
    }

    assert!(!dir.join("las_bbox_qc.geojson.tmp").exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_empty_input_writes_nothing() {
    let reader = MemoryReader::default();
    let aggregator = Aggregator::new(&reader);
    let writer = CountingWriter::default();

    let result = pipeline::run(&[], Path::new("unused.geojson"), &aggregator, &writer);

    assert!(matches!(result, Err(QcError::EmptyInput)));
    assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_locked_output_left_untouched() {
    let dir = temp_dir("locked");
    let output = dir.join("las_bbox_qc.geojson");
    std::fs::write(&output, "previous run").unwrap();

    let reader = three_tiles();
    let aggregator = Aggregator::new(&reader);
    let run = pipeline::run(&paths(&["a.las"]), &output, &aggregator, &LockedWriter).unwrap();

    assert_eq!(run.outcome, WriteOutcome::PermissionDenied(output.clone()));
    assert_eq!(run.dataset.len(), 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_unreadable_file_aborts_by_default() {
    let reader = three_tiles();
    let aggregator = Aggregator::new(&reader);
    let writer = CountingWriter::default();

    let result = pipeline::run(
        &paths(&["a.las", "broken.las", "c.las"]),
        Path::new("unused.geojson"),
        &aggregator,
        &writer,
    );

    match result {
        Err(QcError::HeaderRead { path, .. }) => assert_eq!(path, PathBuf::from("broken.las")),
        other => panic!("Expected HeaderRead, got {:?}", other.map(|r| r.outcome)),
    }
    assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_skip_unreadable_and_continue() {
    let dir = temp_dir("skip");
    let output = dir.join("las_bbox_qc.geojson");
    let reader = three_tiles();
    let aggregator = Aggregator::new(&reader).with_read_failure_policy(ReadFailurePolicy::Skip);

    let run = pipeline::run(
        &paths(&["a.las", "broken.las", "c.las"]),
        &output,
        &aggregator,
        &GeoJsonDatasetWriter,
    )
    .unwrap();

    assert_eq!(run.dataset.len(), 2);
    assert_eq!(run.dataset.skipped.len(), 1);
    assert_eq!(run.dataset.skipped[0].path, PathBuf::from("broken.las"));

    let text = std::fs::read_to_string(&output).unwrap();
    match text.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
        other => panic!("Expected FeatureCollection, got {:?}", other),
    }

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_mixed_crs_uniform_policy_fails_before_write() {
    let reader = three_tiles().with_tile("d.las", (20.0, 20.0, 30.0, 30.0), Some(2154));
    let aggregator = Aggregator::new(&reader).with_crs_policy(CrsPolicy::Uniform);
    let writer = CountingWriter::default();

    let result = pipeline::run(
        &paths(&["a.las", "d.las"]),
        Path::new("unused.geojson"),
        &aggregator,
        &writer,
    );

    match result {
        Err(QcError::MixedCrs { codes }) => assert_eq!(codes, vec![6933, 2154]),
        other => panic!("Expected MixedCrs, got {:?}", other.map(|r| r.outcome)),
    }
    assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_parallel_matches_sequential() {
    let reader = three_tiles();
    let files = paths(&["a.las", "b.laz", "c.las"]);
    let writer = CountingWriter::default();

    let sequential = pipeline::run(&files, Path::new("unused.geojson"), &Aggregator::new(&reader), &writer)
        .unwrap();
    let parallel = pipeline::run(
        &files,
        Path::new("unused.geojson"),
        &Aggregator::new(&reader).with_jobs(4),
        &writer,
    )
    .unwrap();

    assert_eq!(sequential.dataset.records, parallel.dataset.records);
    assert_eq!(sequential.dataset.crs, parallel.dataset.crs);
    assert_eq!(writer.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_crs_last_seen_gives_none() {
    let dir = temp_dir("nocrs");
    let output = dir.join("las_bbox_qc.geojson");
    let reader = three_tiles().with_tile("nocrs.las", (0.0, 0.0, 1.0, 1.0), None);
    let aggregator = Aggregator::new(&reader);

    let run = pipeline::run(
        &paths(&["a.las", "nocrs.las"]),
        &output,
        &aggregator,
        &GeoJsonDatasetWriter,
    )
    .unwrap();
    assert_eq!(run.dataset.crs, None);

    let text = std::fs::read_to_string(&output).unwrap();
    match text.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => {
            let has_crs = fc
                .foreign_members
                .as_ref()
                .map_or(false, |members| members.contains_key("crs"));
            assert!(!has_crs);
            assert_eq!(fc.features[1].property("crs").unwrap(), "None");
        }
        other => panic!("Expected FeatureCollection, got {:?}", other),
    }

    std::fs::remove_dir_all(dir).ok();
}
