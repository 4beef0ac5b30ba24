use url::Url;

/// What the host rendering layer reports about the document.
///
/// In a browser these mirror DOM mutations over elements carrying the
/// discover marker; any host can feed the queue from its own render
/// events.
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A marked link or form was rendered, or its target attribute
    /// changed. `opt_out` mirrors an explicit "do not discover" value on
    /// the marker.
    ElementRendered {
        kind: ElementKind,
        target: String,
        opt_out: bool,
    },
    /// A previously rendered element left the document.
    ElementRemoved { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Navigation link; the target is its `href`.
    Link,
    /// Form-like submit element; the target is its `action`.
    Form,
}

/// Extract a registrable path from an element target.
///
/// Only same-origin targets with a concrete path are eligible; foreign
/// absolute URLs and opaque schemes yield `None`.
pub fn candidate_path(origin: &Url, target: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }
    let joined = origin.join(target).ok()?;
    if joined.origin() != origin.origin() {
        return None;
    }
    Some(routefog_protocol::paths::normalize(joined.path()))
}
