use std::ffi::OsString;
use std::fs;

use bytes::BytesMut;
use lantern::http::listing::{DirectoryListing, ListingEntry, read_entries};

fn html(listing: DirectoryListing) -> String {
    String::from_utf8(listing.render()).unwrap()
}

/// Hrefs in document order.
fn hrefs(html: &str) -> Vec<String> {
    html.split("<a href=\"")
        .skip(1)
        .map(|rest| rest.split('"').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_listing_sorted_with_directory_slashes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "bb").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::create_dir(dir.path().join("c")).unwrap();
    fs::write(dir.path().join("Zed.png"), "zzz").unwrap();

    let out = html(DirectoryListing::read(dir.path(), "/", "/").unwrap());

    assert_eq!(hrefs(&out), vec!["/Zed.png", "/a.txt", "/b.txt", "/c/"]);
    assert!(out.starts_with("<html><head><title>/</title></head><body><table>"));
    assert!(out.ends_with("</table></body></html>"));
    assert!(out.contains("<tr><td><a href=\"/a.txt\">a.txt</a></td><td>1</td></tr>"));
    assert!(out.contains("<tr><td><a href=\"/b.txt\">b.txt</a></td><td>2</td></tr>"));
}

#[test]
fn test_listing_links_use_base() {
    let entries = vec![
        ListingEntry {
            name: OsString::from("guide.html"),
            is_dir: false,
            size: 10,
        },
        ListingEntry {
            name: OsString::from("img"),
            is_dir: true,
            size: 4096,
        },
    ];

    let out = html(DirectoryListing::from_entries(entries, "/docs/", "/docs/"));

    assert_eq!(hrefs(&out), vec!["/docs/guide.html", "/docs/img/"]);
    assert!(out.contains("<td>4096</td>"));
}

#[test]
fn test_listing_encodes_names_in_links() {
    let entries = vec![ListingEntry {
        name: OsString::from("my file.txt"),
        is_dir: false,
        size: 0,
    }];

    let out = html(DirectoryListing::from_entries(entries, "/", "/"));

    assert!(out.contains("<a href=\"/my%20file.txt\">my file.txt</a>"));
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = html(DirectoryListing::read(dir.path(), "/empty/", "/empty/").unwrap());

    assert_eq!(
        out,
        "<html><head><title>/empty/</title></head><body><table></table></body></html>"
    );
}

#[test]
fn test_listing_streams_one_row_per_chunk() {
    let entries = (0..3)
        .map(|i| ListingEntry {
            name: OsString::from(format!("f{i}")),
            is_dir: false,
            size: i,
        })
        .collect();
    let mut listing = DirectoryListing::from_entries(entries, "/", "/");

    let mut chunks = Vec::new();
    loop {
        let mut buf = BytesMut::new();
        if !listing.next_chunk(&mut buf) {
            assert!(buf.is_empty());
            break;
        }
        chunks.push(String::from_utf8(buf.to_vec()).unwrap());
    }

    // header, three rows, footer
    assert_eq!(chunks.len(), 5);
    assert!(chunks[1].starts_with("<tr>") && chunks[1].contains("f0"));
    assert!(chunks[3].contains("f2"));
    assert_eq!(chunks[4], "</table></body></html>");
}

#[test]
fn test_read_entries_dangling_symlink() {
    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link")).unwrap();

    let entries = read_entries(dir.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, OsString::from("link"));
    assert!(!entries[0].is_dir);
}
