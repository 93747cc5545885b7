use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Placeholder for optional listing fields whose node is absent.
pub const NOT_AVAILABLE: &str = "N/A";

// Listing pages (popular, latest, search results).
selector!(LISTING_ITEM_SELECTOR, ".list-update_item");
selector!(LISTING_TITLE_SELECTOR, ".title");
selector!(LISTING_LINK_SELECTOR, "a[href]");
selector!(LISTING_COVER_SELECTOR, "img[src]");
selector!(LISTING_CHAPTER_SELECTOR, ".chapter");
selector!(LISTING_SCORE_SELECTOR, ".numscore");
selector!(LISTING_TIME_SELECTOR, ".timeago[datetime]");
selector!(LISTING_TYPE_SELECTOR, ".type");
selector!(LISTING_STATUS_SELECTOR, ".status");
selector!(NEXT_PAGE_SELECTOR, "a.next.page-numbers[href]");

// Detail pages.
selector!(DETAIL_TITLE_SELECTOR, ".komik_info-content-body-title");
selector!(DETAIL_THUMBNAIL_SELECTOR, ".komik_info-content-thumbnail img");
selector!(DETAIL_NATIVE_TITLE_SELECTOR, ".komik_info-content-native");
selector!(DETAIL_SYNOPSIS_SELECTOR, ".komik_info-description-sinopsis");
selector!(DETAIL_GENRE_SELECTOR, ".komik_info-content-genre .genre-item");
selector!(DETAIL_META_SELECTOR, ".komik_info-content-meta span");
selector!(DETAIL_TYPE_SELECTOR, ".komik_info-content-info-type a");
selector!(DETAIL_UPDATED_SELECTOR, ".komik_info-content-update time[datetime]");
selector!(DETAIL_RATING_SELECTOR, ".data-rating[data-ratingkomik]");
selector!(DETAIL_CHAPTER_ITEM_SELECTOR, ".komik_info-chapters-item");
selector!(DETAIL_CHAPTER_LINK_SELECTOR, ".chapter-link-item[href]");
selector!(DETAIL_CHAPTER_TIME_SELECTOR, ".chapter-link-time");
regex!(RATING_REGEX, r"^\d+(?:\.\d+)?$");

// Reader pages.
selector!(CHAPTER_TITLE_SELECTOR, ".chapter_headpost h1");
selector!(CHAPTER_OPTION_SELECTOR, ".chapter_nav-control select#slch option");
selector!(CHAPTER_PREV_SELECTOR, "a[rel='prev'][href]");
selector!(CHAPTER_NEXT_SELECTOR, "a[rel='next'][href]");
selector!(CHAPTER_IMAGE_SELECTOR, "img.alignnone");
