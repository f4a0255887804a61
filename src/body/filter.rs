/// Collision category/mask bits plus an optional override group, deciding
/// which fixture pairs the contact manager even attempts to collide.
///
/// Checked before narrow-phase ever runs, so filtered pairs never cost a
/// shape query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    /// Which categories this fixture belongs to.
    pub category_bits: u32,
    /// Which categories this fixture collides with.
    pub mask_bits: u32,
    /// Overrides category/mask when nonzero and shared between two fixtures:
    /// positive groups always collide, negative groups never collide.
    pub group: i32,
}

impl Filter {
    /// Collides with everything, in no particular group.
    pub const ALL: Self = Self {
        category_bits: 0x0001,
        mask_bits: u32::MAX,
        group: 0,
    };

    /// Whether two filters allow their fixtures to collide.
    pub fn should_collide(&self, other: &Self) -> bool {
        if self.group != 0 && self.group == other.group {
            return self.group > 0;
        }
        (self.category_bits & other.mask_bits) != 0 && (other.category_bits & self.mask_bits) != 0
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_collides_with_itself() {
        let a = Filter::default();
        assert!(a.should_collide(&a));
    }

    #[test]
    fn negative_group_never_collides() {
        let a = Filter {
            group: -1,
            ..Filter::default()
        };
        assert!(!a.should_collide(&a));
    }

    #[test]
    fn positive_group_always_collides_even_with_disjoint_masks() {
        let a = Filter {
            category_bits: 0x1,
            mask_bits: 0x0,
            group: 5,
        };
        let b = Filter {
            category_bits: 0x2,
            mask_bits: 0x0,
            group: 5,
        };
        assert!(a.should_collide(&b));
    }

    #[test]
    fn disjoint_masks_without_group_do_not_collide() {
        let a = Filter {
            category_bits: 0x1,
            mask_bits: 0x2,
            group: 0,
        };
        let b = Filter {
            category_bits: 0x1,
            mask_bits: 0x2,
            group: 0,
        };
        assert!(!a.should_collide(&b));
    }
}
