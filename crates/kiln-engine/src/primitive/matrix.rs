use glam::{Mat4, Vec2, Vec3};

/// One of the five matrices composing a primitive's model matrix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixKind {
    Translation,
    Scale,
    Size,
    Rotation,
    Anchor,
}

impl MatrixKind {
    /// Upload order.
    pub const ALL: [MatrixKind; 5] = [
        MatrixKind::Translation,
        MatrixKind::Scale,
        MatrixKind::Size,
        MatrixKind::Rotation,
        MatrixKind::Anchor,
    ];

    /// Uniform the matrix is uploaded to.
    pub const fn uniform_name(self) -> &'static str {
        match self {
            MatrixKind::Translation => "mTranslate",
            MatrixKind::Scale => "mScale",
            MatrixKind::Size => "mSize",
            MatrixKind::Rotation => "mRotation",
            MatrixKind::Anchor => "mAnchor",
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small set of [`MatrixKind`]s.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub fn insert(&mut self, kind: MatrixKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn contains(self, kind: MatrixKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = MatrixKind> {
        MatrixKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<MatrixKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = MatrixKind>>(iter: I) -> Self {
        let mut set = KindSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Transform attributes of a primitive.
///
/// `anchor` is in size-local units: `(0, 0)` is the top-left of the shape,
/// `size / 2` its center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec2,
    pub size: Vec2,
    pub anchor: Vec2,
    /// Radians around +Z.
    pub angle: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Transform {
    pub fn new(position: Vec3, size: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
            size,
            anchor: Vec2::ZERO,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }

    /// Builds the matrix of `kind` from the current attributes.
    pub fn matrix(&self, kind: MatrixKind) -> Mat4 {
        match kind {
            MatrixKind::Translation => Mat4::from_translation(self.position),
            MatrixKind::Scale => {
                let sx = if self.flip_x { -self.scale.x } else { self.scale.x };
                let sy = if self.flip_y { -self.scale.y } else { self.scale.y };
                Mat4::from_scale(Vec3::new(sx, sy, 1.0))
            }
            MatrixKind::Size => Mat4::from_scale(self.size.extend(1.0)),
            MatrixKind::Rotation => Mat4::from_rotation_z(self.angle),
            MatrixKind::Anchor => Mat4::from_translation((-self.anchor).extend(0.0)),
        }
    }

    /// `translate * rotate * scale * anchor * size`.
    ///
    /// Anchor sits between scale and size so scaling and rotation pivot on the
    /// anchor point. The order is not interchangeable.
    pub fn model(&self) -> Mat4 {
        compose(|kind| self.matrix(kind))
    }
}

fn compose(matrix: impl Fn(MatrixKind) -> Mat4) -> Mat4 {
    matrix(MatrixKind::Translation)
        * matrix(MatrixKind::Rotation)
        * matrix(MatrixKind::Scale)
        * matrix(MatrixKind::Anchor)
        * matrix(MatrixKind::Size)
}

/// A matrix and its staleness flag.
///
/// Invariant: `value` is safe to reuse exactly when `dirty` is false.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CachedMatrix {
    pub value: Mat4,
    pub dirty: bool,
}

impl Default for CachedMatrix {
    fn default() -> Self {
        Self { value: Mat4::IDENTITY, dirty: true }
    }
}

/// The five cached matrices of a primitive, each with its own dirty flag.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MatrixSet {
    slots: [CachedMatrix; 5],
}

impl MatrixSet {
    /// All matrices start dirty.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, kind: MatrixKind) -> Mat4 {
        self.slots[kind as usize].value
    }

    #[inline]
    pub fn is_dirty(&self, kind: MatrixKind) -> bool {
        self.slots[kind as usize].dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self, kind: MatrixKind) {
        self.slots[kind as usize].dirty = true;
    }

    /// Recomputes every dirty matrix from `transform` and clears its flag.
    /// Clean matrices keep their value bit for bit.
    ///
    /// Returns the kinds that were recomputed.
    pub fn refresh(&mut self, transform: &Transform) -> KindSet {
        let mut recomputed = KindSet::EMPTY;
        for kind in MatrixKind::ALL {
            let slot = &mut self.slots[kind as usize];
            if slot.dirty {
                slot.value = transform.matrix(kind);
                slot.dirty = false;
                recomputed.insert(kind);
            }
        }
        recomputed
    }

    /// Model matrix composed from the cached values.
    pub fn model(&self) -> Mat4 {
        compose(|kind| self.get(kind))
    }
}
