mod common;

use assert_cmd::Command;
use calamine::{Reader, open_workbook_auto};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use common::{TestWorkspace, listing_csv};

#[test]
fn export_writes_a_styled_workbook_with_filtered_rows() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "listings.csv",
        &listing_csv(&[
            ("Amazon", "Samsung", "QN90C", "65", "QLED", "4K", "$1,299.99"),
            ("BestBuy", "LG", "C3", "55", "OLED", "4K", "$1,499.00"),
        ]),
    );
    let out = workspace.path().join("export.xlsx");
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "--select",
            "Brand=Samsung",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("export.xlsx"));

    let mut workbook = open_workbook_auto(&out).expect("reopen workbook");
    let range = workbook.worksheet_range("Data").expect("Data sheet");
    // Header row plus the single Samsung row; the LG row was filtered out.
    assert_eq!(range.height(), 2);
    assert_eq!(range.get_value((0, 1)).unwrap().to_string(), "Brand");
    assert_eq!(range.get_value((1, 1)).unwrap().to_string(), "Samsung");
    assert_eq!(range.get_value((1, 2)).unwrap().to_string(), "QN90C");
}

#[test]
fn export_default_filename_is_date_stamped() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "listings_20240512.csv",
        &listing_csv(&[("Amazon", "Samsung", "QN90C", "65", "QLED", "4K", "$500")]),
    );
    let output = Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args(["export"])
        .assert()
        .success()
        .stdout(contains("mall-listings_").and(contains(".xlsx")))
        .get_output()
        .stdout
        .clone();
    let printed = String::from_utf8(output).expect("utf8 stdout");
    let filename = printed.trim();
    assert!(workspace.path().join(filename).exists());
}

#[test]
fn failed_export_leaves_no_partial_file() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "listings.csv",
        &listing_csv(&[("Amazon", "Samsung", "QN90C", "65", "QLED", "4K", "$500")]),
    );
    let out = workspace.path().join("no-such-dir").join("export.xlsx");
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Export failed"));
    assert!(!out.exists());
}
