mod common;

use std::fs;

use common::{TestWorkspace, report_cmd};
use predicates::str::contains;

const EXPECTED_HEADER: &str = "query_name,containment,barcode\n";

#[test]
fn combines_files_with_barcodes_in_arrival_order() {
    let ws = TestWorkspace::new();
    let first = ws.write("sampleA.csv", "query_name,containment\nNC_1 Ecoli,0.8\n");
    let second = ws.write("sample2.csv", "query_name,containment\nNC_1 Ecoli,0.3\n");
    report_cmd(&ws)
        .args([&first, &second])
        .args(["--combined", "--no-plot"])
        .assert()
        .success();

    assert_eq!(
        ws.read("containment.csv"),
        "query_name,containment,barcode\n\
         NC_1 Ecoli,0.8,sampleA\n\
         NC_1 Ecoli,0.3,sample2\n"
    );
}

#[test]
fn single_file_aggregation_matches_single_mode_plus_a_barcode_column() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "sampleA.csv",
        "query_name,containment,query_md5,median_abund\nNC_1 Ecoli,0.8,abc123,20\n",
    );
    report_cmd(&ws)
        .arg(&input)
        .args(["--combined", "--no-plot"])
        .assert()
        .success();

    assert_eq!(
        ws.read("containment.csv"),
        "query_name,containment,query_md5,median_abund,barcode\n\
         NC_1 Ecoli,0.8,abc123,20,sampleA\n"
    );
}

#[test]
fn search_convention_columns_are_renamed_to_canonical_names() {
    let ws = TestWorkspace::new();
    let input = ws.write("s1.csv", "name,similarity,md5\nNC_1 Ecoli,0.5,abc123\n");
    report_cmd(&ws)
        .arg(&input)
        .args(["--combined", "--no-plot"])
        .assert()
        .success();

    assert_eq!(
        ws.read("containment.csv"),
        "query_name,containment,query_md5,barcode\nNC_1 Ecoli,0.5,abc123,s1\n"
    );
}

#[test]
fn mixed_conventions_union_the_optional_columns() {
    let ws = TestWorkspace::new();
    let first = ws.write(
        "f1.csv",
        "query_name,containment,median_abund\nNC_1 Ecoli,0.9,10\n",
    );
    let second = ws.write("f2.csv", "name,similarity,md5\nNC_2 Styphi,0.2,xyz\n");
    report_cmd(&ws)
        .args([&first, &second])
        .args(["--combined", "--no-plot"])
        .assert()
        .success();

    assert_eq!(
        ws.read("containment.csv"),
        "query_name,containment,query_md5,median_abund,barcode\n\
         NC_1 Ecoli,0.9,,10,f1\n\
         NC_2 Styphi,0.2,xyz,,f2\n"
    );
}

#[test]
fn unusable_inputs_are_skipped_without_failing_the_run() {
    let ws = TestWorkspace::new();
    let missing = ws.file("missing.csv");
    let empty = ws.write("empty.csv", "");
    let mismatched = ws.write("bad.csv", "foo,bar\n1,2\n");
    let good = ws.write("good.csv", "query_name,containment\nNC_1 Ecoli,0.7\n");
    report_cmd(&ws)
        .args([&missing, &empty, &mismatched, &good])
        .args(["--combined", "--no-plot"])
        .assert()
        .success()
        .stderr(contains("Skipping"));

    assert_eq!(
        ws.read("containment.csv"),
        "query_name,containment,barcode\nNC_1 Ecoli,0.7,good\n"
    );
}

#[test]
fn no_contributing_files_persist_a_header_only_table_and_a_placeholder() {
    let ws = TestWorkspace::new();
    let missing_a = ws.file("a.csv");
    let missing_b = ws.file("b.csv");
    report_cmd(&ws)
        .args([&missing_a, &missing_b])
        .arg("--combined")
        .assert()
        .success();

    assert_eq!(ws.read("containment.csv"), EXPECTED_HEADER);
    assert_eq!(ws.read("containment_plot.png"), "No valid data found");
}

#[test]
fn rerunning_the_aggregator_is_byte_identical() {
    let ws = TestWorkspace::new();
    let first = ws.write("sampleA.csv", "query_name,containment\nNC_1 Ecoli,0.8\n");
    let second = ws.write("sample2.csv", "query_name,containment\nNC_10 Ecoli,0.3\n");

    report_cmd(&ws)
        .args([&first, &second])
        .args(["--combined", "--no-plot"])
        .assert()
        .success();
    let first_run = fs::read(ws.file("containment.csv")).expect("first output");

    report_cmd(&ws)
        .args([&first, &second])
        .args(["--combined", "--no-plot"])
        .assert()
        .success();
    let second_run = fs::read(ws.file("containment.csv")).expect("second output");

    assert_eq!(first_run, second_run);
}
