use commons_kit::adapters::{archive, fs};
use commons_kit::core::copier::copy_chars;
use commons_kit::domain::ports::CharReader;
use commons_kit::utils::blacklist::Blacklist;
use commons_kit::{ByteCopier, CharCopier, LibConfig};
use std::fs::File;
use tempfile::TempDir;

fn populate(base: &std::path::Path) {
    fs::write_text(base.join("README.md"), "# Project\n").unwrap();
    fs::write_text(base.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write_text(base.join("src/util/text.rs"), "pub fn t() {}\n").unwrap();
    fs::write_text(base.join("docs/guide.md"), "Guide\n").unwrap();
}

#[test]
fn test_archive_round_trip_keeps_layout() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    populate(&project);

    let config = LibConfig::from_toml_str("[io]\nbuffer_size = 5\n").unwrap();
    let zip_path = temp_dir.path().join("project.zip");
    assert_eq!(
        archive::zip_dir(&zip_path, &project, config.buffer_size()).unwrap(),
        4
    );

    let restored = temp_dir.path().join("restored");
    archive::unzip(&zip_path, &restored, config.buffer_size()).unwrap();

    let pattern = fs::compile_filesystem_pattern("src/**.rs").unwrap();
    let sources = fs::list_recursive(&restored, true, false, Some(&pattern)).unwrap();
    assert_eq!(
        sources,
        vec![restored.join("src/main.rs"), restored.join("src/util/text.rs")]
    );
    assert_eq!(
        fs::read_text(restored.join("src/util/text.rs")).unwrap(),
        "pub fn t() {}\n"
    );
}

#[test]
fn test_copier_on_background_thread_with_files() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.bin");
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source_path, &data).unwrap();

    let source = File::open(&source_path).unwrap();
    let handle = ByteCopier::new()
        .with_buffer_size(1024)
        .spawn(source, Vec::<u8>::new());
    let (result, _, sink) = handle.join().unwrap();

    assert_eq!(result.unwrap(), 50_000);
    assert_eq!(sink, data);
}

#[test]
fn test_char_copy_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("umlauts.txt");
    fs::write_text(&path, "Grüße aus Köln\n").unwrap();

    let mut out: Vec<u8> = Vec::new();
    let count = copy_chars(File::open(&path).unwrap(), &mut out).unwrap();
    assert_eq!(count, 15);
    assert_eq!(String::from_utf8(out).unwrap(), "Grüße aus Köln\n");

    let mut reader = CharReader::new(File::open(&path).unwrap());
    let mut text = String::new();
    CharCopier::new()
        .with_buffer_size(3)
        .copy(&mut reader, &mut text)
        .unwrap();
    assert_eq!(text, "Grüße aus Köln\n");
}

#[test]
fn test_blacklist_from_file_cleans_lines() {
    let temp_dir = TempDir::new().unwrap();
    let list = temp_dir.path().join("blacklist.txt");
    fs::write_text(&list, "# words to drop\nsecret\nconfidential\n").unwrap();
    let input = temp_dir.path().join("input.txt");
    fs::write_text(&input, "public\nSECRET plan\n\nconfidential notes\n").unwrap();

    let mut blacklist = Blacklist::new();
    blacklist.load(&list).unwrap();

    let cleaned: Vec<String> = fs::read_lines(&input, false, false)
        .unwrap()
        .iter()
        .map(|line| blacklist.cleanup(line, true).unwrap().trim().to_string())
        .collect();
    assert_eq!(cleaned, vec!["public", "plan", "notes"]);
}

#[test]
fn test_csv_file_with_semicolons() {
    use commons_kit::adapters::csv::{CsvOptions, CsvTable};

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stock.csv");
    fs::write_text(&path, "item;count\nbolts;120\nnuts\n\"washers; small\";7\n").unwrap();

    let options = CsvOptions::builder()
        .delimiter(';')
        .title_row(true)
        .fill_missing_columns(true)
        .build()
        .unwrap();
    let table = CsvTable::load(&path, &options).unwrap();

    assert_eq!(table.titles(), &["item", "count"]);
    assert_eq!(
        table.column("count").unwrap(),
        vec![Some("120"), None, Some("7")]
    );
    assert_eq!(table.value(2, 0), Some("washers; small"));
}
