use super::*;

pub(crate) const DIARY_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:letterboxd="https://letterboxd.com" xmlns:tmdb="https://themoviedb.org" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Letterboxd - someone</title>
    <link>https://letterboxd.com/someone/</link>
    <description>Letterboxd - someone</description>
    <item>
      <title>Oppenheimer, 2023 - ★★★★½</title>
      <link>https://letterboxd.com/someone/film/oppenheimer-2023/</link>
      <guid isPermaLink="false">letterboxd-review-123</guid>
      <pubDate>Sat, 22 Jul 2023 10:00:00 +1200</pubDate>
      <letterboxd:watchedDate>2023-07-21</letterboxd:watchedDate>
      <letterboxd:rewatch>No</letterboxd:rewatch>
      <letterboxd:filmTitle>Oppenheimer</letterboxd:filmTitle>
      <letterboxd:filmYear>2023</letterboxd:filmYear>
      <letterboxd:memberRating>4.5</letterboxd:memberRating>
      <letterboxd:memberLike>Yes</letterboxd:memberLike>
      <tmdb:movieId>872585</tmdb:movieId>
      <description><![CDATA[ <p><img src="https://a.ltrbxd.com/resized/oppenheimer.jpg"/></p> <p>Three hours went by in a flash.</p> ]]></description>
      <dc:creator>someone</dc:creator>
    </item>
    <item>
      <title>Heat, 1995</title>
      <link>https://letterboxd.com/someone/film/heat/</link>
      <guid isPermaLink="false">letterboxd-watch-456</guid>
      <watchedDate>2023-07-19</watchedDate>
      <rewatch>Yes</rewatch>
      <filmTitle>Heat</filmTitle>
      <filmYear>1995</filmYear>
      <description>&lt;p&gt;&lt;img src="https://a.ltrbxd.com/resized/heat.jpg"/&gt;&lt;/p&gt; &lt;p&gt;Watched on Tuesday July 19, 2023.&lt;/p&gt;</description>
    </item>
    <item>
      <title>Favourite films of the decade</title>
      <link>https://letterboxd.com/someone/list/favourites/</link>
      <guid isPermaLink="false">letterboxd-list-789</guid>
      <description><![CDATA[<p>A list of 10 films</p>]]></description>
    </item>
  </channel>
</rss>"#;

#[test]
fn test_parse_feed_items_in_order() {
    let items = parse_feed(DIARY_FEED).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title.as_deref(), Some("Oppenheimer, 2023 - ★★★★½"));
    assert_eq!(items[1].title.as_deref(), Some("Heat, 1995"));
    assert_eq!(items[2].guid.as_deref(), Some("letterboxd-list-789"));
}

#[test]
fn test_parse_feed_namespaced_fields() {
    let items = parse_feed(DIARY_FEED).unwrap();
    let first = &items[0];

    assert_eq!(first.film_title.as_deref(), Some("Oppenheimer"));
    assert_eq!(first.film_year.as_deref(), Some("2023"));
    assert_eq!(first.member_rating.as_deref(), Some("4.5"));
    assert_eq!(first.watched_date.as_deref(), Some("2023-07-21"));
    assert_eq!(first.rewatch.as_deref(), Some("No"));
    assert_eq!(first.member_like.as_deref(), Some("Yes"));
    assert!(first.html().contains("<img src=\"https://a.ltrbxd.com/resized/oppenheimer.jpg\"/>"));
}

#[test]
fn test_parse_feed_unprefixed_fields_and_escaped_html() {
    let items = parse_feed(DIARY_FEED).unwrap();
    let second = &items[1];

    assert_eq!(second.film_title.as_deref(), Some("Heat"));
    assert_eq!(second.rewatch.as_deref(), Some("Yes"));
    assert_eq!(second.member_rating, None);
    assert!(second.html().starts_with("<p><img src=\"https://a.ltrbxd.com/resized/heat.jpg\"/>"));
}

#[test]
fn test_channel_fields_are_not_items() {
    let xml = r#"<rss><channel><title>Channel</title><link>https://x/</link></channel></rss>"#;
    assert!(parse_feed(xml).unwrap().is_empty());
}

#[test]
fn test_encoded_content_fallback() {
    let xml = r#"<rss xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel><item>
        <title>Alien, 1979</title>
        <content:encoded><![CDATA[<p>In space.</p>]]></content:encoded>
    </item></channel></rss>"#;
    let items = parse_feed(xml).unwrap();
    assert_eq!(items[0].description, None);
    assert_eq!(items[0].html(), "<p>In space.</p>");
}

#[test]
fn test_html_entity_in_escaped_body() {
    let xml = r#"<rss><channel><item><title>Heat, 1995</title><description>&lt;p&gt;&lt;img src="https://a.ltrbxd.com/heat.jpg"/&gt;&lt;/p&gt; &lt;p&gt;Great&nbsp;film.&lt;/p&gt;</description></item></channel></rss>"#;
    let items = parse_feed(xml).unwrap();
    let html = items[0].html();
    assert!(!html.contains("&lt;"));

    let entries = crate::normalize::normalize_items(&items).unwrap();
    assert_eq!(entries[0].poster_url, "https://a.ltrbxd.com/heat.jpg");
    assert_eq!(entries[0].review, "Great\u{a0}film.");
}

#[test]
fn test_unrecognised_entity_left_as_written() {
    let xml = r#"<rss><channel><item><title>Amélie, 2001</title><description>&lt;p&gt;Caf&eacute; &amp;amp; &#233;clair&lt;/p&gt;</description></item></channel></rss>"#;
    let items = parse_feed(xml).unwrap();
    assert_eq!(items[0].title.as_deref(), Some("Amélie, 2001"));
    assert_eq!(items[0].html(), "<p>Caf&eacute; &amp; éclair</p>");
}

#[test]
fn test_malformed_document_is_invalid_feed() {
    let xml = r#"<rss><channel><item><title>Broken</item></channel></rss>"#;
    let err = parse_feed(xml).unwrap_err();
    assert!(matches!(err, FeedError::InvalidFeed(_)));
}

#[test]
fn test_truncated_document_is_invalid_feed() {
    let xml = r#"<rss><channel><item><title>Cut off</title>"#;
    assert!(matches!(parse_feed(xml), Err(FeedError::InvalidFeed(_))));
}

#[test]
fn test_html_page_is_invalid_feed() {
    let html = "<!DOCTYPE html><html><head><title>Not found</title></head><body></body></html>";
    let err = parse_feed(html).unwrap_err();
    assert!(err.detail().unwrap().contains("html"));
}

#[test]
fn test_empty_and_plain_text_are_invalid_feed() {
    assert!(matches!(parse_feed(""), Err(FeedError::InvalidFeed(_))));
    assert!(matches!(parse_feed("Too many requests"), Err(FeedError::InvalidFeed(_))));
}
