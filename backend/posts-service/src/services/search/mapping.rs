/// Index document to API post translation
use super::schema::SolrDoc;
use crate::models::{Post, Site};

impl From<SolrDoc> for Post {
    fn from(doc: SolrDoc) -> Self {
        Post {
            post_id: doc.id,
            post_title: doc.post_title,
            post_link: doc.post_link,
            post_description: doc.post_description,
            // older documents only carry the sorter field
            post_pub_date: doc.post_pub_date_range_utc.or(doc.post_pub_date_sorter),
            post_image: doc.post_image,
            post_tags: doc.post_tags,
            post_media: doc.post_media,
            site: Site {
                site_id: doc.site_id,
                site_name: doc.site_name,
                site_type: doc.site_type,
            },
            score: 0.0,
        }
    }
}

/// Translate documents in backend order.
pub fn to_posts(docs: Vec<SolrDoc>) -> Vec<Post> {
    docs.into_iter().map(Post::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_doc_to_post() {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let doc = SolrDoc {
            id: "42".into(),
            post_title: "Title".into(),
            post_link: "https://example.org/42".into(),
            post_description: "desc".into(),
            post_pub_date_range_utc: Some(published),
            site_id: 5,
            site_name: "Example".into(),
            site_type: "podcast".into(),
            post_tags: vec!["a".into(), "b".into()],
            view_count: 900,
            ..SolrDoc::default()
        };

        let post = Post::from(doc);
        assert_eq!(post.post_id, "42");
        assert_eq!(post.post_pub_date, Some(published));
        assert_eq!(post.site.site_id, 5);
        assert_eq!(post.site.site_type, "podcast");
        assert_eq!(post.post_tags, vec!["a", "b"]);
        assert_eq!(post.score, 0.0);
    }

    #[test]
    fn test_pub_date_falls_back_to_sorter() {
        let sorter = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let doc = SolrDoc {
            id: "1".into(),
            post_pub_date_sorter: Some(sorter),
            ..SolrDoc::default()
        };
        assert_eq!(Post::from(doc).post_pub_date, Some(sorter));
    }

    #[test]
    fn test_to_posts_keeps_order() {
        let docs = ["c", "a", "b"]
            .iter()
            .map(|id| SolrDoc {
                id: id.to_string(),
                ..SolrDoc::default()
            })
            .collect();
        let ids: Vec<String> = to_posts(docs).into_iter().map(|p| p.post_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
