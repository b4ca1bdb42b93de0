use core_types::{DateKey, PriceSeries, Selection};
use datastore::{
    DataLayout, PathResolver, ReadOptions, parse_output, read_series, verify_prior, write_results,
};
use std::fs;

fn series(len: usize) -> PriceSeries {
    let dates = (0..len).map(|i| spring_day(i as u32)).collect();
    PriceSeries::new(dates, (0..len).map(|i| 10.0 + i as f64).collect()).unwrap()
}

// Consecutive calendar days from 2021-03-01 through April.
fn spring_day(offset: u32) -> DateKey {
    if offset < 31 {
        DateKey::from_packed(20210301 + offset).unwrap()
    } else {
        DateKey::from_packed(20210401 + offset - 31).unwrap()
    }
}

#[test]
fn fresh_write_then_append_keeps_the_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("SPY3days.csv");
    let window = 3;

    let short = series(8);
    write_results(&path, &[0.5, 0.25, 0.0, -0.125, 1.0], &short, window, false).unwrap();
    let first = fs::read(&path).unwrap();
    assert_eq!(
        String::from_utf8(first.clone()).unwrap(),
        "Period Number,Value,Date\n\
         1,0.5,2021-03-04\n\
         2,0.25,2021-03-05\n\
         3,0,2021-03-06\n\
         4,-0.125,2021-03-07\n\
         5,1,2021-03-08\n"
    );

    let long = series(10);
    let rows = parse_output(&first).unwrap();
    let covered = verify_prior(&rows, &long, window).unwrap();
    assert_eq!(covered, 5);

    write_results(&path, &[2.0, 3.5], &long, window, true).unwrap();
    let second = fs::read(&path).unwrap();
    assert_eq!(&second[..first.len()], &first[..]);
    assert_eq!(
        String::from_utf8(second[first.len()..].to_vec()).unwrap(),
        "6,2,2021-03-09\n7,3.5,2021-03-10\n"
    );
    assert_eq!(verify_prior(&parse_output(&second).unwrap(), &long, window), Ok(7));
}

#[test]
fn written_files_read_back_through_the_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let spy = Selection::new("Stocks", "SPY");
    fs::create_dir_all(layout.selection_dir(&spy)).unwrap();
    fs::write(
        layout.input_path(&spy),
        "2021-03-01\t10\n2021-03-02\t11\n2021-03-03\t12.5\n",
    )
    .unwrap();

    let loaded = read_series(&layout.input_path(&spy), ReadOptions::default()).unwrap();
    assert_eq!(loaded.prices(), &[10.0, 11.0, 12.5]);
    assert_eq!(loaded.first_date().unwrap().to_string(), "2021-03-01");

    write_results(&layout.output_path(&spy, 2), &[0.75], &loaded, 2, false).unwrap();
    let out = fs::read_to_string(layout.output_path(&spy, 2)).unwrap();
    assert_eq!(out, "Period Number,Value,Date\n1,0.75,2021-03-03\n");
}
