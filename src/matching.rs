use crate::error::{DedupError, Result};
use crate::model::{SimilarityScore, StoredQuestion};
use crate::similarity::cosine_similarity;

/// Minimum cosine similarity for two questions to count as the same.
/// Paraphrases from `text-embedding-3-small` land around 0.70-0.75.
pub const DEFAULT_THRESHOLD: f32 = 0.70;

#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch<'a> {
    pub row: &'a StoredQuestion,
    pub similarity: f32,
}

fn score(query: &[f32], row: &StoredQuestion) -> Result<f32> {
    cosine_similarity(query, &row.embedding).map_err(|err| match err {
        DedupError::DimensionMismatch { expected, found } => DedupError::StoredDimensionMismatch {
            question_id: row.id,
            expected,
            found,
        },
        other => other,
    })
}

/// Linear scan for the most similar row at or above `threshold`.
///
/// Only a strictly greater score replaces the running best, so among equal
/// scores the first row in `rows` wins.
pub fn best_match<'a>(
    query: &[f32],
    rows: &'a [StoredQuestion],
    threshold: f32,
) -> Result<Option<BestMatch<'a>>> {
    let mut best: Option<BestMatch<'a>> = None;

    for row in rows {
        let sim = score(query, row)?;
        if sim < threshold {
            continue;
        }
        let better = match &best {
            Some(current) => sim > current.similarity,
            None => true,
        };
        if better {
            best = Some(BestMatch {
                row,
                similarity: sim,
            });
        }
    }

    Ok(best)
}

/// Every row scored against `query`, highest first. Equal scores keep
/// storage order.
pub fn rank_similarities(query: &[f32], rows: &[StoredQuestion]) -> Result<Vec<SimilarityScore>> {
    let mut scored = rows
        .iter()
        .map(|row| {
            Ok(SimilarityScore {
                id: row.id,
                text: row.text.clone(),
                similarity: score(query, row)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, emb: Vec<f32>, cluster_id: Option<u64>) -> StoredQuestion {
        StoredQuestion {
            id,
            text: format!("q{id}"),
            embedding: emb,
            cluster_id,
        }
    }

    #[test]
    fn empty_rows_have_no_match() {
        assert!(best_match(&[1.0, 0.0], &[], DEFAULT_THRESHOLD).unwrap().is_none());
    }

    #[test]
    fn picks_highest_score_above_threshold() {
        let rows = vec![
            row(1, vec![0.8, 0.6], None),
            row(2, vec![0.99, 0.14], Some(4)),
            row(3, vec![0.0, 1.0], None),
        ];
        let best = best_match(&[1.0, 0.0], &rows, DEFAULT_THRESHOLD)
            .unwrap()
            .expect("match");
        assert_eq!(best.row.id, 2);
        assert_eq!(best.row.cluster_id, Some(4));
        assert!(best.similarity > 0.98);
    }

    #[test]
    fn nothing_below_threshold_matches() {
        let rows = vec![row(1, vec![0.6, 0.8], None), row(2, vec![0.0, 1.0], None)];
        assert!(best_match(&[1.0, 0.0], &rows, DEFAULT_THRESHOLD).unwrap().is_none());
    }

    #[test]
    fn score_equal_to_threshold_matches() {
        let rows = vec![row(1, vec![1.0, 0.0], None)];
        assert!(best_match(&[1.0, 0.0], &rows, 1.0).unwrap().is_some());
    }

    #[test]
    fn ties_keep_first_seen_row() {
        let rows = vec![
            row(1, vec![2.0, 0.0], Some(10)),
            row(2, vec![1.0, 0.0], Some(20)),
        ];
        let best = best_match(&[1.0, 0.0], &rows, DEFAULT_THRESHOLD)
            .unwrap()
            .expect("match");
        assert_eq!(best.row.id, 1);
    }

    #[test]
    fn stored_dimension_mismatch_names_question() {
        let rows = vec![row(1, vec![1.0, 0.0], None), row(9, vec![1.0, 0.0, 0.0], None)];
        let err = best_match(&[1.0, 0.0], &rows, DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(
            err,
            DedupError::StoredDimensionMismatch { question_id: 9, .. }
        ));
    }

    #[test]
    fn ranking_sorts_descending() {
        let rows = vec![
            row(1, vec![0.0, 1.0], None),
            row(2, vec![1.0, 0.0], None),
            row(3, vec![0.7, 0.7], None),
        ];
        let ranked = rank_similarities(&[1.0, 0.0], &rows).unwrap();
        let ids: Vec<u64> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn large_embeddings_match_with_finite_score() {
        let rows = vec![row(1, vec![1e30, 0.0], None)];
        let best = best_match(&[1e30, 0.0], &rows, DEFAULT_THRESHOLD)
            .unwrap()
            .expect("match");
        assert!((best.similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nan_embedding_aborts_scan() {
        let rows = vec![row(1, vec![f32::NAN, 0.0], None)];
        let err = best_match(&[1.0, 0.0], &rows, DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(err, DedupError::NonFiniteSimilarity));
    }
}
