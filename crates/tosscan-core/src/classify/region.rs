//! Footer / navigation region detection on an anchor's container chain.

use super::Container;

/// Page regions where legal links usually live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Footer,
    Nav,
}

impl RegionKind {
    /// Region passes run in this order.
    pub const ALL: [RegionKind; 2] = [RegionKind::Footer, RegionKind::Nav];

    fn tag(self) -> &'static str {
        match self {
            RegionKind::Footer => "footer",
            RegionKind::Nav => "nav",
        }
    }

    fn markers(self) -> &'static [&'static str] {
        match self {
            RegionKind::Footer => &["footer"],
            RegionKind::Nav => &["nav", "menu"],
        }
    }

    /// True if `container` is a region of this kind (by tag, class or id).
    pub fn contains(self, container: &Container) -> bool {
        if container.tag.eq_ignore_ascii_case(self.tag()) {
            return true;
        }
        let named = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| {
                let v = v.to_ascii_lowercase();
                self.markers().iter().any(|m| v.contains(m))
            })
        };
        named(&container.class) || named(&container.id)
    }
}

/// Index of the innermost container of `kind`, if the anchor sits inside one.
///
/// `containers` is ordered innermost-first.
pub fn region_position(containers: &[Container], kind: RegionKind) -> Option<usize> {
    containers.iter().position(|c| kind.contains(c))
}

/// Class and id values of the containers strictly inside the region element.
pub fn inner_hints(containers: &[Container], region_at: usize) -> Vec<&str> {
    containers[..region_at]
        .iter()
        .flat_map(|c| [c.class.as_deref(), c.id.as_deref()])
        .flatten()
        .filter(|s| !s.is_empty())
        .collect()
}
