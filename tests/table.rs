mod common;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use common::{TestWorkspace, listing_csv};

fn sample_csv() -> String {
    listing_csv(&[
        ("Amazon", "Samsung", "QN90C", "65", "QLED", "4K", "$1,299.99"),
        ("Amazon", "LG", "C3", "55", "OLED", "4K", "$1,499.00"),
        ("BestBuy", "Samsung", "CU7000", "50", "LED", "4K", "$379.99"),
        ("Walmart", "TCL", "S455", "43", "LED", "4K", "$228.00"),
    ])
}

#[test]
fn table_prints_all_rows_without_selections() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("listings.csv", &sample_csv());
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args(["table", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("QN90C")
                .and(contains("S455"))
                .and(contains("page 1 / 1 (4 row(s))")),
        );
}

#[test]
fn table_applies_brand_selection_preserving_order() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("listings.csv", &sample_csv());
    let output = Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args([
            "table",
            "-i",
            input.to_str().unwrap(),
            "--select",
            "Brand=Samsung",
        ])
        .assert()
        .success()
        .stdout(contains("page 1 / 1 (2 row(s))").and(contains("LG").not()))
        .get_output()
        .stdout
        .clone();
    let rendered = String::from_utf8(output).expect("utf8 stdout");
    let first = rendered.find("QN90C").expect("first Samsung row");
    let second = rendered.find("CU7000").expect("second Samsung row");
    assert!(first < second, "dataset order must be preserved");
}

#[test]
fn table_paginates_and_clamps_page_number() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("listings.csv", &sample_csv());
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args([
            "table",
            "-i",
            input.to_str().unwrap(),
            "--per-page",
            "3",
            "--page",
            "9",
        ])
        .assert()
        .success()
        .stdout(contains("page 2 / 2 (4 row(s))").and(contains("S455")));
}

#[test]
fn cleared_column_excludes_every_row() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("listings.csv", &sample_csv());
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args(["table", "-i", input.to_str().unwrap(), "--clear", "Brand"])
        .assert()
        .success()
        .stdout(contains("page 1 / 1 (0 row(s))"));
}

#[test]
fn missing_required_column_rejects_the_file() {
    let workspace = TestWorkspace::new();
    let truncated_header = common::LISTING_HEADER
        .strip_suffix(",URL")
        .expect("header ends with URL");
    let input = workspace.write(
        "bad.csv",
        &format!("{truncated_header}\nAmazon,Samsung,QN90C,65,QLED,4K,120Hz,500 nits,WebOS,$1,HDR10,img\n"),
    );
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args(["table", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("missing required column").and(contains("URL")));
}

#[test]
fn default_dataset_is_the_latest_date_stamped_csv() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "listings_20240110.csv",
        &listing_csv(&[("Amazon", "LG", "OldModel", "55", "OLED", "4K", "$900")]),
    );
    workspace.write(
        "listings_20240512.csv",
        &listing_csv(&[("Amazon", "Samsung", "NewModel", "65", "QLED", "4K", "$1,100")]),
    );
    Command::cargo_bin("mall-dashboard")
        .expect("binary exists")
        .args(["table", "--data-dir", workspace.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("NewModel").and(contains("OldModel").not()));
}
