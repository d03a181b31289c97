//! Even distribution of employees across companies.

use thiserror::Error;

/// Errors raised when the distribution parameters are unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Split `n_people` across `n_companies` so that counts differ by at most one.
///
/// The first `n_people % n_companies` companies (in generation order) receive
/// one extra employee.
pub fn distribute_employees(
    n_people: u64,
    n_companies: u64,
) -> Result<Vec<u64>, DistributionError> {
    if n_companies == 0 {
        return Err(DistributionError::InvalidArgument(
            "company count must be at least 1".to_string(),
        ));
    }

    let base = n_people / n_companies;
    let remainder = n_people % n_companies;

    Ok((0..n_companies)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_people_three_companies() {
        assert_eq!(distribute_employees(10, 3).unwrap(), vec![4, 3, 3]);
    }

    #[test]
    fn test_exact_split() {
        assert_eq!(distribute_employees(99_000, 1_000).unwrap(), vec![99; 1_000]);
    }

    #[test]
    fn test_fewer_people_than_companies() {
        let counts = distribute_employees(2, 5).unwrap();
        assert_eq!(counts, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_zero_people() {
        assert_eq!(distribute_employees(0, 4).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_zero_companies_is_rejected() {
        let result = distribute_employees(10, 0);
        assert!(matches!(result, Err(DistributionError::InvalidArgument(_))));
    }

    #[test]
    fn test_sum_length_and_balance() {
        for n_people in 0..120u64 {
            for n_companies in 1..25u64 {
                let counts = distribute_employees(n_people, n_companies).unwrap();

                assert_eq!(counts.len() as u64, n_companies);
                assert_eq!(counts.iter().sum::<u64>(), n_people);

                let max = *counts.iter().max().unwrap();
                let min = *counts.iter().min().unwrap();
                assert!(max - min <= 1, "unbalanced split for {n_people}/{n_companies}");

                // Larger shares always come first.
                assert!(counts.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }
}
