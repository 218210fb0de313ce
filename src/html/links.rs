//! Link validation and external-link attributes.

use super::dom::{self, HtmlDocument};
use super::{Transform, TransformError, ValidationError, is_absolute_url};
use url::Url;

/// Validate every `<a href>` and open external links in a new tab.
///
/// An absolute link pointing at the site's own host is an authoring
/// mistake (internal links must be root-relative), so it fails validation
/// instead of being rewritten. The scheme does not matter, and neither does
/// an explicit port equal to the site's or the scheme default:
/// `http://example.com/x` and `https://example.com:443/x` are both internal
/// for an `https://example.com` site.
pub struct ExternalLinks {
    site: Option<Url>,
}

impl ExternalLinks {
    pub fn new(origin: impl AsRef<str>) -> Self {
        Self {
            site: Url::parse(origin.as_ref()).ok(),
        }
    }

    fn is_own_origin(&self, href: &str) -> bool {
        let Some(site) = &self.site else {
            return false;
        };
        let Ok(target) = site.join(href) else {
            return false;
        };
        target.host_str().is_some()
            && target.host_str() == site.host_str()
            && (target.port().is_none()
                || target.port_or_known_default() == site.port_or_known_default())
    }
}

impl Transform for ExternalLinks {
    fn name(&self) -> &'static str {
        "external-links"
    }

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        for link in doc.elements("a") {
            let href = dom::get_attr(&link, "href")
                .filter(|h| !h.is_empty())
                .ok_or_else(|| {
                    ValidationError::EmptyLink(dom::text_content(&link).trim().to_string())
                })?;
            if !is_absolute_url(&href) {
                continue;
            }
            if self.is_own_origin(&href) {
                return Err(ValidationError::InternalLinkMarkedAbsolute(href).into());
            }
            dom::set_attr(&link, "target", "_blank");
            dom::set_attr(&link, "rel", "noopener noreferrer");
        }
        Ok(doc)
    }
}
