/// Currency of every amount the analysis backend returns.
///
/// The product is locale-fixed to Indian Rupees, but the currency is still
/// modelled explicitly so formatting rules live in one place.
///
/// ## Minor units
///
/// [`Money`](crate::money::Money) stores an `i64` number of **minor units**
/// (paise). `minor_units()` returns how many fraction digits are used when
/// converting between major units (`10.50 INR`) and minor units (`1050`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Currency {
    Inr,
}

impl Currency {
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Currency::Inr => "₹",
        }
    }

    /// Number of fraction digits used when formatting amounts.
    pub(crate) const fn minor_units(self) -> u8 {
        match self {
            Currency::Inr => 2,
        }
    }

    /// Splits an integer part into display groups.
    ///
    /// INR uses the Indian system: the last three digits form one group and
    /// every group before it has two digits (`1,00,00,000`).
    pub(crate) fn group_digits(self, digits: &str) -> String {
        match self {
            Currency::Inr => {
                if digits.len() <= 3 {
                    return digits.to_string();
                }
                let (mut head, tail) = digits.split_at(digits.len() - 3);
                let mut groups = vec![tail];
                while head.len() > 2 {
                    let (rest, group) = head.split_at(head.len() - 2);
                    groups.push(group);
                    head = rest;
                }
                groups.push(head);
                groups.reverse();
                groups.join(",")
            }
        }
    }
}
