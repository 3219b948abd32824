/// A quarterly anchor: which month of the quarter and which day of that month.
///
/// Payments store it packed into one integer as `day_of_month + 31 * month_offset`,
/// which leaves exactly nine valid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterDay {
    /// 0, 1 or 2 for the first, second or third month of the quarter.
    pub month_offset: u32,
    /// 1, 15 or 31. Day 31 clamps to the last day of shorter months.
    pub day_of_month: u32,
}

impl QuarterDay {
    pub const PACKED_VALUES: [i32; 9] = [1, 15, 31, 32, 46, 62, 63, 77, 93];

    pub fn from_packed(day: i32) -> Option<Self> {
        let index = Self::PACKED_VALUES.iter().position(|&valid| valid == day)?;
        let month_offset = (index / 3) as u32;
        Some(Self {
            month_offset,
            day_of_month: (day as u32) - 31 * month_offset,
        })
    }

    pub fn packed(self) -> i32 {
        (self.day_of_month + 31 * self.month_offset) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_all_valid_values() {
        let unpacked: Vec<(u32, u32)> = QuarterDay::PACKED_VALUES
            .iter()
            .map(|&day| {
                let q = QuarterDay::from_packed(day).unwrap();
                (q.month_offset, q.day_of_month)
            })
            .collect();

        assert_eq!(
            unpacked,
            vec![
                (0, 1), (0, 15), (0, 31),
                (1, 1), (1, 15), (1, 31),
                (2, 1), (2, 15), (2, 31),
            ]
        );
    }

    #[test]
    fn test_packed_is_inverse() {
        for day in QuarterDay::PACKED_VALUES {
            assert_eq!(QuarterDay::from_packed(day).unwrap().packed(), day);
        }
    }

    #[test]
    fn test_rejects_values_outside_set() {
        for day in [0, 2, 14, 16, 30, 33, 47, 61, 64, 92, 94, -1] {
            assert_eq!(QuarterDay::from_packed(day), None, "day {} should be rejected", day);
        }
    }
}
