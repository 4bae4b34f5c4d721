//! Page discovery and ordering within a chapter folder

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File extensions recognized as page images
pub const PAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Check if a file extension belongs to a page image
pub fn is_page_extension(extension: &str) -> bool {
    PAGE_EXTENSIONS
        .iter()
        .any(|&ext| ext.eq_ignore_ascii_case(extension))
}

/// List the page image files directly inside `dir`.
///
/// Only regular files with a recognized extension are kept; subdirectories
/// and other file types are silently skipped. The returned order is whatever
/// the filesystem yields, use [`sort_pages`] before assembling a document.
pub fn list_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_file() {
            continue;
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if is_page_extension(ext) {
                pages.push(path);
            }
        }
    }

    Ok(pages)
}

/// Sort page files into reading order.
///
/// When every filename stem is purely numeric the files are ordered by
/// numeric value, so "2.jpg" comes before "10.jpg". A single non-numeric
/// stem ("cover.jpg") demotes the whole listing to lexicographic order on
/// the raw filename; there is no numeric-first merge between the two kinds.
pub fn sort_pages(pages: &mut [PathBuf]) {
    if pages.iter().all(|p| numeric_stem(p).is_some()) {
        pages.sort_by_key(|p| numeric_stem(p).unwrap_or(u64::MAX));
    } else {
        pages.sort_by(|a, b| compare_file_names(a, b));
    }
}

/// Parse the filename stem as an unsigned integer, if it is purely numeric.
fn numeric_stem(path: &Path) -> Option<u64> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse::<u64>().ok())
}

fn compare_file_names(a: &Path, b: &Path) -> Ordering {
    let name_a = a.file_name().unwrap_or_default();
    let name_b = b.file_name().unwrap_or_default();
    name_a.cmp(name_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_numeric_order_beats_lexicographic() {
        let mut pages = paths(&["2.jpg", "10.jpg", "1.jpg"]);
        sort_pages(&mut pages);
        assert_eq!(names(&pages), vec!["1.jpg", "2.jpg", "10.jpg"]);
    }

    #[test]
    fn test_numeric_order_across_extensions() {
        let mut pages = paths(&["003.webp", "2.png", "10.jpeg", "1.jpg"]);
        sort_pages(&mut pages);
        assert_eq!(names(&pages), vec!["1.jpg", "2.png", "003.webp", "10.jpeg"]);
    }

    #[test]
    fn test_non_numeric_stem_forces_lexicographic_order() {
        let mut pages = paths(&["cover.jpg", "1.jpg", "2.jpg"]);
        sort_pages(&mut pages);
        assert_eq!(names(&pages), vec!["1.jpg", "2.jpg", "cover.jpg"]);

        // Not a numeric-first merge: "10" sorts before "2" lexicographically
        let mut pages = paths(&["10.jpg", "2.jpg", "cover.jpg"]);
        sort_pages(&mut pages);
        assert_eq!(names(&pages), vec!["10.jpg", "2.jpg", "cover.jpg"]);
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(is_page_extension("jpg"));
        assert!(is_page_extension("JPEG"));
        assert!(is_page_extension("Png"));
        assert!(is_page_extension("WEBP"));
        assert!(!is_page_extension("gif"));
        assert!(!is_page_extension("pdf"));
        assert!(!is_page_extension(""));
    }

    #[test]
    fn test_list_pages_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["1.jpg", "2.PNG", "notes.txt", "3.webp", "thumbs.db"] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("4.jpg")).unwrap();

        let mut pages = list_pages(dir.path()).unwrap();
        sort_pages(&mut pages);
        // The directory named "4.jpg" must not be listed
        assert_eq!(names(&pages), vec!["1.jpg", "2.PNG", "3.webp"]);
    }

    #[test]
    fn test_list_pages_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_pages(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_stem() {
        assert_eq!(numeric_stem(Path::new("12.jpg")), Some(12));
        assert_eq!(numeric_stem(Path::new("007.png")), Some(7));
        assert_eq!(numeric_stem(Path::new("cover.jpg")), None);
        assert_eq!(numeric_stem(Path::new("1a.jpg")), None);
        assert_eq!(numeric_stem(Path::new("-1.jpg")), None);
    }
}
