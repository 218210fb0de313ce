//! End-to-end builds with the real image backend.
//!
//! Every test lays out an articles root in a temp directory, writes small
//! generated images, and runs the same builder the CLI uses.

use pressroom::article::{ArticleBuilder, ArticleError};
use pressroom::cache::CacheStats;
use pressroom::config::SiteConfig;
use pressroom::html::{TransformError, ValidationError};
use pressroom::imaging::RustBackend;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ORIGIN: &str = "https://blog.example.com";

const METADATA: &str = r#"{
  "category": "travel",
  "author": "Ada",
  "publishedAt": "March 01, 2021 9:00 AM",
  "timestamp": 1614589200000,
  "keywords": "beach, tides"
}"#;

fn site(root: &Path) -> SiteConfig {
    SiteConfig {
        origin: ORIGIN.to_string(),
        articles_dir: root.join("articles").to_string_lossy().into_owned(),
        public_dir: root.join("public").to_string_lossy().into_owned(),
        ..SiteConfig::default()
    }
}

fn write_article(root: &Path, slug: &str, markdown: &str) {
    let dir = root.join("articles").join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("article.md"), markdown).unwrap();
    fs::write(dir.join("metadata.json"), METADATA).unwrap();
}

fn write_image(path: &Path, width: u32, height: u32, seed: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, seed])
    })
    .save(path)
    .unwrap();
}

fn public_file(root: &Path, url_path: &str) -> std::path::PathBuf {
    root.join("public").join(url_path.trim_start_matches('/'))
}

// =============================================================================
// Single article
// =============================================================================

#[test]
fn minimal_article_builds_into_record() {
    let tmp = TempDir::new().unwrap();
    write_article(
        tmp.path(),
        "low-tide",
        "# Title\n\n**Lede.**\n\n![alt](img.jpg)\n\n*Caption*\n",
    );
    write_image(&tmp.path().join("articles/low-tide/img.jpg"), 64, 32, 1);

    let backend = RustBackend::new();
    let builder = ArticleBuilder::new(&backend, &site(tmp.path()));
    let record = builder.build_article("low-tide").unwrap();

    assert_eq!(record.title, "Title");
    assert_eq!(record.description, "Lede.");
    assert_eq!(record.absolute_url, format!("{ORIGIN}/article/low-tide"));
    assert!(record
        .cover_image_url
        .starts_with(&format!("{ORIGIN}/article/low-tide/img-")));
    assert!(record.cover_image_url.ends_with(".jpg"));
    assert!(record.thumbnail.ends_with(".thumb.jpg"));
    assert_eq!(record.keywords, vec!["beach", "tides"]);

    let cover_path = record.cover_image_url.trim_start_matches(ORIGIN);
    assert!(public_file(tmp.path(), cover_path).is_file());
    let thumb = image::open(public_file(tmp.path(), &record.thumbnail)).unwrap();
    assert_eq!(thumb.width(), 300);
    assert_eq!(thumb.height(), 150);
}

#[test]
fn wide_images_are_capped_and_reencoded_as_jpeg() {
    let tmp = TempDir::new().unwrap();
    write_article(
        tmp.path(),
        "wide",
        "# Wide\n\n**Lede.**\n\n![panorama](photos/pano.png)\n",
    );
    write_image(&tmp.path().join("articles/wide/photos/pano.png"), 2000, 500, 2);

    let backend = RustBackend::new();
    let builder = ArticleBuilder::new(&backend, &site(tmp.path()));
    let record = builder.build_article("wide").unwrap();

    let path = record.cover_image_url.trim_start_matches(ORIGIN);
    assert!(path.starts_with("/article/wide/photos/pano-"));
    let optimized = public_file(tmp.path(), path);
    assert_eq!(image::image_dimensions(&optimized).unwrap(), (1536, 384));
    assert_eq!(
        image::ImageFormat::from_path(&optimized).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert!(record.html.contains(&format!("src=\"{path}\"")));
}

#[test]
fn rebuild_reuses_exports_and_follows_content_changes() {
    let tmp = TempDir::new().unwrap();
    write_article(tmp.path(), "post", "# Post\n\n**Lede.**\n\n![a](a.png)\n");
    let source = tmp.path().join("articles/post/a.png");
    write_image(&source, 40, 20, 1);

    let backend = RustBackend::new();
    let config = site(tmp.path());

    let first = ArticleBuilder::new(&backend, &config);
    let v1 = first.build_article("post").unwrap();
    assert_eq!(first.exporter().stats(), CacheStats { hits: 0, misses: 2 });

    let second = ArticleBuilder::new(&backend, &config);
    assert_eq!(second.build_article("post").unwrap(), v1);
    assert_eq!(second.exporter().stats(), CacheStats { hits: 2, misses: 0 });

    // New bytes, new hash, new path.
    write_image(&source, 40, 20, 9);
    let third = ArticleBuilder::new(&backend, &config);
    let v2 = third.build_article("post").unwrap();
    assert_ne!(v2.cover_image_url, v1.cover_image_url);

    // Old export stays on disk, so reverting is a cache hit.
    write_image(&source, 40, 20, 1);
    let fourth = ArticleBuilder::new(&backend, &config);
    assert_eq!(fourth.build_article("post").unwrap(), v1);
    assert_eq!(fourth.exporter().stats(), CacheStats { hits: 2, misses: 0 });
}

#[test]
fn no_cache_reencodes_existing_exports() {
    let tmp = TempDir::new().unwrap();
    write_article(tmp.path(), "post", "# Post\n\n**Lede.**\n\n![a](a.png)\n");
    write_image(&tmp.path().join("articles/post/a.png"), 40, 20, 1);

    let backend = RustBackend::new();
    let config = site(tmp.path());
    ArticleBuilder::new(&backend, &config)
        .build_article("post")
        .unwrap();

    let forced = ArticleBuilder::new(&backend, &config).force(true);
    forced.build_article("post").unwrap();
    assert_eq!(forced.exporter().stats(), CacheStats { hits: 0, misses: 2 });
}

#[test]
fn corrupt_image_fails_without_leaving_output() {
    let tmp = TempDir::new().unwrap();
    write_article(tmp.path(), "post", "# Post\n\n**Lede.**\n\n![a](a.png)\n");
    let source = tmp.path().join("articles/post/a.png");
    fs::write(&source, b"definitely not a png").unwrap();

    let backend = RustBackend::new();
    let err = ArticleBuilder::new(&backend, &site(tmp.path()))
        .build_article("post")
        .unwrap_err();

    assert!(matches!(err, ArticleError::Transform(TransformError::Export(_))));
    let out = tmp.path().join("public/article/post");
    let leftovers = fs::read_dir(&out).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

// =============================================================================
// Whole site
// =============================================================================

#[test]
fn build_all_isolates_failures_per_slug() {
    let tmp = TempDir::new().unwrap();
    for (slug, seed) in [("alpha", 1), ("gamma", 3)] {
        write_article(
            tmp.path(),
            slug,
            "# Good\n\n**Lede.**\n\n![cover](cover.png)\n",
        );
        write_image(
            &tmp.path().join("articles").join(slug).join("cover.png"),
            32,
            32,
            seed,
        );
    }
    write_article(
        tmp.path(),
        "beta",
        "# Bad\n\n**Lede.**\n\n![remote](https://cdn.example.org/x.png)\n",
    );
    fs::create_dir_all(tmp.path().join("articles/.git")).unwrap();

    let backend = RustBackend::new();
    let report = ArticleBuilder::new(&backend, &site(tmp.path()))
        .build_all(None)
        .unwrap();

    let built: Vec<_> = report.articles.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(built, vec!["alpha", "gamma"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].slug, "beta");
    assert!(matches!(
        report.failures[0].error,
        ArticleError::Transform(TransformError::Validation(
            ValidationError::AbsoluteImageUrl(_)
        ))
    ));
    assert_eq!(report.cache_stats, CacheStats { hits: 0, misses: 4 });
}

#[test]
fn records_serialize_for_downstream_consumers() {
    let tmp = TempDir::new().unwrap();
    write_article(tmp.path(), "post", "# Post\n\n**Lede.**\n\n![a](a.png)\n");
    write_image(&tmp.path().join("articles/post/a.png"), 16, 16, 1);

    let backend = RustBackend::new();
    let report = ArticleBuilder::new(&backend, &site(tmp.path()))
        .build_all(None)
        .unwrap();

    let json = serde_json::to_value(&report.articles).unwrap();
    let first = &json[0];
    assert_eq!(first["slug"], "post");
    assert_eq!(first["url"], "/article/post");
    assert_eq!(first["publishedAt"], "March 01, 2021 9:00 AM");
    assert_eq!(first["readingTime"], "1 min read");
}
