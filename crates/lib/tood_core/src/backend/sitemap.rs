//! Sitemap for the public site: the home page plus one entry per venue
//! that has a menu today.

use std::fmt::Write;

use super::BuffetSummary;

/// Render a sitemap document for `site_url` (no trailing slash).
pub fn render_sitemap(site_url: &str, buffets: &[BuffetSummary]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    push_url(&mut xml, &format!("{site_url}/"), "daily", "1.0");

    let menu_ids = buffets
        .iter()
        .filter(|b| b.has_today_menu)
        .filter_map(|b| b.today_menu_id);
    for menu_id in menu_ids {
        push_url(&mut xml, &format!("{site_url}/tood/{menu_id}"), "weekly", "0.8");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, changefreq: &str, priority: &str) {
    // Writing to a String cannot fail.
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <changefreq>{changefreq}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n",
        escape(loc)
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffet(has_today_menu: bool, today_menu_id: Option<i64>) -> BuffetSummary {
        BuffetSummary {
            id: Some(1),
            has_today_menu,
            today_menu_id,
        }
    }

    #[test]
    fn lists_home_and_todays_menus() {
        let xml = render_sitemap(
            "https://tood.example",
            &[
                buffet(true, Some(41)),
                buffet(false, Some(42)),
                buffet(true, None),
                buffet(true, Some(43)),
            ],
        );
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://tood.example/</loc>"));
        assert!(xml.contains("<loc>https://tood.example/tood/41</loc>"));
        assert!(!xml.contains("/tood/42"));
        assert!(xml.contains("<loc>https://tood.example/tood/43</loc>"));
        assert_eq!(xml.matches("<url>").count(), 3);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn empty_list_keeps_home_page() {
        let xml = render_sitemap("https://tood.example", &[]);
        assert_eq!(xml.matches("<url>").count(), 1);
        assert!(xml.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn escapes_site_url() {
        let xml = render_sitemap("https://tood.example/?a=1&b=2", &[]);
        assert!(xml.contains("?a=1&amp;b=2/"));
    }
}
