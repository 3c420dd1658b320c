/// Coarse category attached to every allocation, used for bucketed
/// statistics and per-subsystem leak accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryTag {
    #[default]
    Unknown,
    Render,
    Physics,
    Audio,
    Ui,
    Temp,
    Ecs,
    Resource,
    Script,
}

impl MemoryTag {
    /// All tag variants, in declaration order — used to seed statistics
    /// tables so every tag has an entry even before its first allocation.
    pub const ALL: [MemoryTag; 9] = [
        MemoryTag::Unknown,
        MemoryTag::Render,
        MemoryTag::Physics,
        MemoryTag::Audio,
        MemoryTag::Ui,
        MemoryTag::Temp,
        MemoryTag::Ecs,
        MemoryTag::Resource,
        MemoryTag::Script,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MemoryTag::Unknown => "unknown",
            MemoryTag::Render => "render",
            MemoryTag::Physics => "physics",
            MemoryTag::Audio => "audio",
            MemoryTag::Ui => "ui",
            MemoryTag::Temp => "temp",
            MemoryTag::Ecs => "ecs",
            MemoryTag::Resource => "resource",
            MemoryTag::Script => "script",
        }
    }
}
