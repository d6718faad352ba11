//! Surface classification.
//!
//! Every mesh of a loaded room is tagged exactly once at ingestion time with a
//! [`SurfaceKind`] derived from its name. Only walls and floors can be picked,
//! highlighted and retextured; everything else is [`SurfaceKind::Unclassified`].

/// What a mesh represents in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Wall,
    Floor,
    Unclassified,
}

impl SurfaceKind {
    /// Walls and floors are the only kinds eligible for material swapping.
    pub fn is_classified(self) -> bool {
        !matches!(self, SurfaceKind::Unclassified)
    }

    /// Label shown in the hover tooltip.
    pub fn label(self) -> &'static str {
        match self {
            SurfaceKind::Wall => "Wall",
            SurfaceKind::Floor => "Floor",
            SurfaceKind::Unclassified => "",
        }
    }
}

/// Lookup key of a mesh inside the scene. Assigned sequentially during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// A classified mesh reference.
///
/// This is a key, not the mesh: geometry and material stay owned by the scene
/// and are looked up through `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Surface {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
}

/// Ordered substring rules mapping mesh names to kinds.
///
/// Matching is case-sensitive and the first rule whose pattern occurs in the
/// name wins, so rule order is the priority contract for names that contain
/// more than one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierRules {
    rules: Vec<(String, SurfaceKind)>,
}

impl ClassifierRules {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule with lower priority than every rule added before it.
    pub fn with_rule(mut self, pattern: &str, kind: SurfaceKind) -> Self {
        self.rules.push((pattern.to_string(), kind));
        self
    }

    pub fn rules(&self) -> &[(String, SurfaceKind)] {
        &self.rules
    }

    /// Classify a mesh by name.
    pub fn classify(&self, mesh_name: &str) -> SurfaceKind {
        let mut matches = self
            .rules
            .iter()
            .filter(|(pattern, _)| mesh_name.contains(pattern.as_str()));
        let Some((_, kind)) = matches.next() else {
            return SurfaceKind::Unclassified;
        };
        if matches.any(|(_, other)| other != kind) {
            log::warn!(
                "Mesh name {:?} matches rules of several kinds, tagging it as {:?} by rule order",
                mesh_name,
                kind
            );
        }
        *kind
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self::new()
            .with_rule("Wall", SurfaceKind::Wall)
            .with_rule("Floor", SurfaceKind::Floor)
    }
}

/// Classify with the default `Wall` / `Floor` rules.
pub fn classify(mesh_name: &str) -> SurfaceKind {
    ClassifierRules::default().classify(mesh_name)
}
