//! Every resource type the API serves.
use once_cell::sync::Lazy;

use super::schema::{FieldSpec, FilterSpec, LimitRule, ParamSource, Schema};
use crate::filter::SortDirection;
use crate::store::value::FieldValue;

static CATALOG: Lazy<Vec<Schema>> = Lazy::new(build_catalog);

/// All schemas, in mount order
pub fn all() -> &'static [Schema] {
    &CATALOG
}

/// Look up a schema by its route (e.g. `"sports/fixtures"`)
pub fn find(route: &str) -> Option<&'static Schema> {
    CATALOG.iter().find(|s| s.route == route)
}

fn build_catalog() -> Vec<Schema> {
    vec![
        jobs(),
        movies(),
        transport(),
        news(),
        offers(),
        notifications(),
        updates(),
        results(),
        sports_fixtures(),
        sports_results(),
        famous_foods(),
        famous_stays(),
        history(),
        common_ads(),
        ads(),
    ]
}

fn jobs() -> Schema {
    Schema::new("jobs", "jobs", "Job")
        .keys("jobs", "job")
        .require("title", "Job title is required")
        .field(FieldSpec::text("company"))
        .field(FieldSpec::text("location"))
        .field(FieldSpec::text("salary"))
        .field(FieldSpec::text_or("type", "full-time"))
        .field(FieldSpec::text("description"))
        .field(FieldSpec::text("applyUrl"))
        .field(FieldSpec::array("tags"))
        .field(FieldSpec::fixed("status", "open"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("type"))
        .filter(FilterSpec::eq("location"))
        .params_from(ParamSource::Body)
        .limit(LimitRule::numeric_only(100))
}

fn movies() -> Schema {
    Schema::new("movies", "movies", "Movie")
        .keys("movies", "movie")
        .require("title", "Movie title is required")
        .field(FieldSpec::text("language"))
        .field(FieldSpec::array("genre"))
        .field(FieldSpec::text("duration"))
        .field(FieldSpec::text("rating"))
        .field(FieldSpec::text("releaseDate"))
        .field(FieldSpec::text("description"))
        .field(FieldSpec::text("posterUrl"))
        .field(FieldSpec::text("trailerUrl"))
        .field(FieldSpec::fixed("status", "active"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq_or("status", "active"))
        .filter(FilterSpec::eq("language"))
        .params_from(ParamSource::Body)
        .limit(LimitRule::capped(100))
}

fn transport() -> Schema {
    Schema::new("transport", "transport", "Transport")
        .keys("transports", "transport")
        .require("name", "Transport name is required")
        .require("type", "Transport type is required")
        .field(FieldSpec::text("route"))
        .field(FieldSpec::text("contactNumber"))
        .field(FieldSpec::text("description"))
        .field(FieldSpec::fixed("status", "active"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("type"))
        .limit(LimitRule::capped(100))
}

fn news() -> Schema {
    Schema::new("news", "news", "News article")
        .keys("news", "article")
        .require("title", "Title is required")
        .field(FieldSpec::text("category"))
        .field(FieldSpec::text_or("status", "draft"))
        .field(FieldSpec::flag("pinned"))
        .field(FieldSpec::flag("featured"))
        .field(FieldSpec::text("author"))
        .field(FieldSpec::timestamp("publishDate"))
        .field(FieldSpec::text_or("visibility", "site-wide"))
        .field(FieldSpec::nullable("coverImageUrl"))
        .field(FieldSpec::text("summary"))
        .field(FieldSpec::text("body"))
        .field(FieldSpec::array("tags"))
        .field(FieldSpec::nullable("sourceUrl"))
        .field(FieldSpec::nullable("seoTitle"))
        .field(FieldSpec::nullable("seoDescription"))
        .field(FieldSpec::flag("showRightRailAd"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("category"))
        .filter(FilterSpec::eq("status"))
        .filter(FilterSpec::contains("tag", "tags"))
        .limit(LimitRule::capped(50))
        .messages("News ID required", "News not found")
}

fn offers() -> Schema {
    Schema::new("offers", "offers", "Offer")
        .keys("offers", "offer")
        .field(FieldSpec::text("title"))
        .field(FieldSpec::text_or("status", "draft"))
        .field(FieldSpec::text("category"))
        .field(FieldSpec::text("discountType"))
        .field(FieldSpec::text("discountValue"))
        .field(FieldSpec::text("shortDescription"))
        .field(FieldSpec::text("couponCode"))
        .field(FieldSpec::text("minCart"))
        .field(FieldSpec::text("location"))
        .field(FieldSpec::text("bookingUrl"))
        .field(FieldSpec::timestamp("expiry"))
        .field(FieldSpec::array("tags"))
        .field(FieldSpec::text("mediaUrl"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("category"))
        .filter(FilterSpec::eq("status"))
        .filter(FilterSpec::contains("tag", "tags"))
}

fn notifications() -> Schema {
    Schema::new("notifications", "notifications", "Notification")
        .keys("notifications", "notification")
        .require("title", "Title and message are required")
        .require("message", "Title and message are required")
        .field(FieldSpec::text_or("type", "info"))
        .field(FieldSpec::text_or("priority", "normal"))
        .field(FieldSpec::text_or("audience", "public"))
        .field(FieldSpec::nullable("actionUrl"))
        .field(FieldSpec::timestamp("expiresAt"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("type"))
        .filter(FilterSpec::eq("priority"))
        .filter(FilterSpec::eq("audience"))
        .params_from(ParamSource::Body)
        .limit(LimitRule::capped(50))
}

fn updates() -> Schema {
    Schema::new("updates", "updates", "Update")
        .keys("updates", "update")
        .require("title", "Title and description are required")
        .require("description", "Title and description are required")
        .field(FieldSpec::text_or("type", "general"))
        .field(FieldSpec::text_or("priority", "normal"))
        .field(FieldSpec::text_or("visibility", "public"))
        .field(FieldSpec::nullable("relatedUrl"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("type"))
        .filter(FilterSpec::eq("priority"))
        .filter(FilterSpec::eq("visibility"))
        .limit(LimitRule::capped(50))
}

fn results() -> Schema {
    Schema::new("results", "results", "Result")
        .keys("results", "result")
        .require("title", "Title and description are required")
        .require("description", "Title and description are required")
        .field(FieldSpec::text("category"))
        .field(FieldSpec::nullable("score"))
        .field(FieldSpec::text_or("status", "published"))
        .field(FieldSpec::timestamp_or_now("publishedAt"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("category"))
        .filter(FilterSpec::eq("status"))
        .order_by("publishedAt", SortDirection::Desc)
        .params_from(ParamSource::Body)
        .limit(LimitRule::numeric_only(50))
}

fn sports_fixtures() -> Schema {
    Schema::new("sports/fixtures", "sports_fixtures", "Fixture")
        .keys("fixtures", "fixture")
        .require("teamA", "Teams are required")
        .require("teamB", "Teams are required")
        .derive("title", "{teamA} vs {teamB}")
        .field(FieldSpec::text("matchType"))
        .field(FieldSpec::text("venue"))
        .field(FieldSpec::timestamp("matchDate"))
        .field(FieldSpec::text("description"))
        .field(FieldSpec::fixed("status", "upcoming"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("status"))
        .filter(FilterSpec::eq("matchType"))
}

fn sports_results() -> Schema {
    Schema::new("sports/results", "sports_results", "Match result")
        .keys("results", "result")
        .require("teamA", "Teams are required")
        .require("teamB", "Teams are required")
        .derive("title", "{teamA} vs {teamB}")
        .field(FieldSpec::verbatim("scoreA", FieldValue::Null))
        .field(FieldSpec::verbatim("scoreB", FieldValue::Null))
        .field(FieldSpec::text("winner"))
        .field(FieldSpec::text("matchType"))
        .field(FieldSpec::text("venue"))
        .field(FieldSpec::timestamp("matchDate"))
        .field(FieldSpec::text("summary"))
        .field(FieldSpec::fixed("status", "completed"))
        .field(FieldSpec::nullable("createdBy"))
        .filter(FilterSpec::eq("matchType"))
}

fn famous_foods() -> Schema {
    Schema::new("famousFoods", "famous_foods", "Food")
        .keys("foods", "food")
        .require("name", "Food name is required")
        .field(FieldSpec::verbatim("category", "".into()))
        .field(FieldSpec::verbatim("priceRange", "".into()))
        .field(FieldSpec::verbatim("location", "".into()))
        .field(FieldSpec::verbatim("rating", FieldValue::Integer(0)))
        .field(FieldSpec::verbatim("description", "".into()))
        .field(FieldSpec::array("tags"))
        .field(FieldSpec::verbatim("imageUrl", "".into()))
        .field(FieldSpec::flag("mustTry"))
        .field(FieldSpec::verbatim("createdBy", FieldValue::Null))
        .filter(FilterSpec::eq("category"))
        .filter(FilterSpec::contains("tag", "tags"))
        .limit(LimitRule::capped(100))
}

fn famous_stays() -> Schema {
    Schema::new("famousStay", "famous_stays", "Stay")
        .keys("stays", "stay")
        .require("name", "Stay name is required")
        .field(FieldSpec::verbatim("category", "".into()))
        .field(FieldSpec::verbatim("location", "".into()))
        .field(FieldSpec::verbatim("priceRange", "".into()))
        .field(FieldSpec::verbatim("rating", FieldValue::Integer(0)))
        .field(FieldSpec::verbatim("description", "".into()))
        .field(FieldSpec::array("amenities"))
        .field(FieldSpec::array("images"))
        .field(FieldSpec::array("highlights"))
        .field(FieldSpec::verbatim("contactNumber", "".into()))
        .field(FieldSpec::verbatim("websiteUrl", "".into()))
        .field(FieldSpec::verbatim("mapUrl", "".into()))
        .field(FieldSpec::verbatim("createdBy", FieldValue::Null))
        .filter(FilterSpec::eq("category"))
        .limit(LimitRule::capped(100))
}

fn history() -> Schema {
    Schema::new("history", "history_sections", "History section")
        .keys("history", "section")
        .require("title", "Title is required")
        .field(FieldSpec::text("subtitle"))
        .field(FieldSpec::text("description"))
        .field(FieldSpec::text("imageUrl"))
        .field(FieldSpec::text("year"))
        .field(FieldSpec::or_default("order", FieldValue::Integer(0)))
        .field(FieldSpec::array("tags"))
        .field(FieldSpec::nullable("createdBy"))
        .order_by("order", SortDirection::Asc)
        .messages("Section ID required", "History section not found")
}

fn common_ads() -> Schema {
    Schema::new("commonAds", "commonAds", "Common Ad")
        .keys("ads", "ad")
        .require("title", "Missing required fields")
        .require("imageUrl", "Missing required fields")
        .require("destinationUrl", "Missing required fields")
        .field(FieldSpec::text("ctaText"))
        .field(FieldSpec::verbatim("placement", "site-wide".into()))
        .field(FieldSpec::verbatim("status", "active".into()))
        .filter(FilterSpec::eq("placement"))
        .filter(FilterSpec::eq("status"))
        .with_status_toggle()
        .messages("Missing ad id", "Common Ad not found")
}

fn ads() -> Schema {
    Schema::new("ads", "ads", "Ad")
        .keys("ads", "ad")
        .require("title", "title is required")
        .limit(LimitRule::capped(50))
}
