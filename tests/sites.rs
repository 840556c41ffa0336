mod common;

use common::{FakeDriver, Node, StubImages};
use movie_scraper::config::{EpikaSettings, MediatekaSettings};
use movie_scraper::discover::discover;
use movie_scraper::enrich::Enricher;
use movie_scraper::sites::epika::{self, selectors as ep};
use movie_scraper::sites::mediateka::{self, selectors as md};
use movie_scraper::sites::{Epika, Mediateka};
use movie_scraper::waits::Pacing;
use movie_scraper::Candidate;

fn tile(title: &str, href: &str, cover: &str) -> Node {
    Node::new(ep::TILE)
        .child(Node::new(ep::TILE_TITLE).text(title))
        .child(Node::new(ep::TILE_LINK).attr("href", href))
        .child(Node::new(ep::TILE_COVER).attr("src", cover))
}

fn epika_with(terms: &[&str]) -> Epika {
    Epika::new(&EpikaSettings {
        search_terms: terms.iter().map(|t| t.to_string()).collect(),
    })
}

#[tokio::test]
async fn epika_discovery_dedups_by_url_across_terms() {
    let driver = FakeDriver::new()
        .page(
            &Epika::search_url("drama"),
            vec![
                tile(" Sodas ", "/filmai/u1", "/img/u1.jpg"),
                tile("Upė", "/filmai/u2", "/img/u2.jpg"),
                // no link: logged and skipped
                Node::new(ep::TILE).child(Node::new(ep::TILE_TITLE).text("Be nuorodos")),
            ],
        )
        .page(
            &Epika::search_url("karas"),
            vec![
                tile("Upė", "/filmai/u2", "/img/u2.jpg"),
                tile("Sodas", "/filmai/u3", "/img/u3.jpg"),
            ],
        )
        .failing(&Epika::search_url("sugedęs"));

    let source = epika_with(&["drama", "sugedęs", "karas"]);
    let found = discover(&source, &driver, &Pacing::immediate()).await;

    let urls: Vec<&str> = found.iter().map(|c| c.detail_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://epika.lrt.lt/filmai/u1",
            "https://epika.lrt.lt/filmai/u2",
            "https://epika.lrt.lt/filmai/u3",
        ]
    );
    assert_eq!(found[0].title, "Sodas");
    assert_eq!(found[2].title, "Sodas");
    assert_eq!(found[0].thumbnail_url, "https://epika.lrt.lt/img/u1.jpg");
    assert!(found.iter().all(|c| c.duration_text().is_none() && c.views_text().is_none()));
    assert!(driver.visited(epika::LANDING_URL));
}

#[tokio::test]
async fn epika_detail_page_fills_every_field() {
    let url = "https://epika.lrt.lt/filmai/u1";
    let driver = FakeDriver::new().page(
        url,
        vec![
            Node::new(ep::META_STRIP)
                .child(Node::new(ep::META_ELEMENT).text("2019"))
                .child(Node::new(ep::META_ELEMENT).text("1h 45m"))
                .child(Node::new(ep::META_ELEMENT).text(" "))
                .child(Node::new(ep::META_ELEMENT).text("Drama")),
            Node::new(ep::DESCRIPTION).text("  Istorija apie sodą.  "),
        ],
    );
    let candidates = vec![Candidate::new("Sodas", url, "https://epika.lrt.lt/img/u1.jpg")];

    let pacing = Pacing::immediate();
    let records = Enricher::new(&driver, &StubImages, &pacing, false)
        .enrich(&epika_with(&[]), &candidates)
        .await;

    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.title, "Sodas");
    assert_eq!(r.source_url, url);
    assert_eq!(r.release_year, Some(2019));
    assert_eq!(r.duration_minutes, Some(105));
    assert_eq!(r.genre.as_deref(), Some("Drama"));
    assert_eq!(r.description, "Istorija apie sodą.");
    assert_eq!(r.image.as_deref(), Some("https://epika.lrt.lt/img/u1.jpg".as_bytes()));
    assert_eq!(r.views, None);
}

#[tokio::test]
async fn epika_page_without_metadata_is_partial() {
    let url = "https://epika.lrt.lt/filmai/tuscias";
    let driver = FakeDriver::new().page(url, vec![]);
    let candidates = vec![Candidate::new("Tuščias", url, "https://cdn/broken.jpg")];
    let pacing = Pacing::immediate();

    let kept = Enricher::new(&driver, &StubImages, &pacing, true)
        .enrich(&epika_with(&[]), &candidates)
        .await;
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].description, "");
    assert_eq!(kept[0].image, None);
    assert_eq!(kept[0].release_year, None);

    let dropped = Enricher::new(&driver, &StubImages, &pacing, false)
        .enrich(&epika_with(&[]), &candidates)
        .await;
    assert!(dropped.is_empty());
}

fn block(title: &str, href: &str, duration: Option<&str>, views: Option<&str>) -> Node {
    let mut node = Node::new(md::BLOCK)
        .child(Node::new(md::TITLE_LINK).text(title).attr("href", href))
        .child(Node::new(md::IMAGE).attr("src", "/img/cover.jpg"));
    if let Some(d) = duration {
        node = node.child(Node::new(md::DURATION).text(d));
    }
    if let Some(v) = views {
        node = node.child(Node::new(md::VIEWS).text(v));
    }
    node
}

#[tokio::test]
async fn mediateka_listing_skips_galleries_and_articles() {
    let driver = FakeDriver::new().page(
        mediateka::LANDING_URL,
        vec![
            block("Broliai", "/mediateka/irasas/1", Some("1:32:10"), Some("1 234")),
            block("Galerija", "/mediateka/irasas/2", Some("0:45"), None)
                .child(Node::new(md::NOT_MOVIE[1])),
            block("Straipsnis", "/naujienos/3", None, None),
            block("Trumpas", "/mediateka/irasas/4", Some("05:20"), None),
        ],
    );

    let source = Mediateka::new(&MediatekaSettings::default());
    let found = discover(&source, &driver, &Pacing::immediate()).await;

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].title, "Broliai");
    assert_eq!(found[0].detail_url, "https://www.lrt.lt/mediateka/irasas/1");
    assert_eq!(found[0].thumbnail_url, "https://www.lrt.lt/img/cover.jpg");
    assert_eq!(found[0].duration_text(), Some("1:32:10"));
    assert_eq!(found[0].views_text(), Some("1 234"));
    assert_eq!(found[1].detail_url, "https://www.lrt.lt/mediateka/irasas/4");
    assert_eq!(found[1].views_text(), None);
}

#[tokio::test]
async fn mediateka_details_come_from_tile_and_description() {
    let url = "https://www.lrt.lt/mediateka/irasas/1";
    let driver = FakeDriver::new().page(
        url,
        vec![
            Node::new(md::DESCRIPTION_PARAGRAPHS).text("Tai 2015 m. sukurta drama apie du brolius."),
            Node::new(md::DESCRIPTION_PARAGRAPHS).text("Režisierius – Jonas Jonaitis."),
        ],
    );
    let candidate = Candidate::new("Broliai", url, "https://www.lrt.lt/img/cover.jpg")
        .with_duration(Some("1:32:10".into()))
        .with_views(Some("1 234".into()));

    let pacing = Pacing::immediate();
    let records = Enricher::new(&driver, &StubImages, &pacing, false)
        .enrich(&Mediateka::new(&MediatekaSettings::default()), &[candidate])
        .await;

    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.duration_minutes, Some(92));
    assert_eq!(r.views, Some(1234));
    assert_eq!(r.release_year, Some(2015));
    assert_eq!(r.genre.as_deref(), Some("drama"));
    assert_eq!(
        r.description,
        "Tai 2015 m. sukurta drama apie du brolius. Režisierius – Jonas Jonaitis."
    );
}

#[tokio::test]
async fn mediateka_genre_follows_vocabulary_order() {
    let url = "https://www.lrt.lt/mediateka/irasas/5";
    let driver = FakeDriver::new().page(
        url,
        vec![Node::new(md::DESCRIPTION_PARAGRAPHS).text("Trileris, o kartu ir komedija.")],
    );
    let settings = MediatekaSettings {
        genres: vec!["trileris".into(), "komedija".into()],
        ..MediatekaSettings::default()
    };
    let candidate = Candidate::new("Abu", url, "").with_duration(Some("bad".into()));

    let pacing = Pacing::immediate();
    let records = Enricher::new(&driver, &StubImages, &pacing, true)
        .enrich(&Mediateka::new(&settings), &[candidate])
        .await;

    assert_eq!(records[0].genre.as_deref(), Some("trileris"));
    assert_eq!(records[0].duration_minutes, None);
    assert_eq!(records[0].release_year, None);
}
