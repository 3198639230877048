//! The five post-load integrity checks.

/// Null surrogate keys per dimension, as one row:
/// company, industry, location, date.
pub const NULL_KEYS: &str = r#"
WITH
  cte1 AS (SELECT COUNT(*) AS num_null_keys_company  FROM dim_company  WHERE "company_ID"  IS NULL),
  cte2 AS (SELECT COUNT(*) AS num_null_keys_industry FROM dim_industry WHERE "industry_ID" IS NULL),
  cte3 AS (SELECT COUNT(*) AS num_null_keys_location FROM dim_location WHERE "location_ID" IS NULL),
  cte4 AS (SELECT COUNT(*) AS num_null_keys_date     FROM dim_date     WHERE "date_ID"     IS NULL)
SELECT c1.*, c2.*, c3.*, c4.*
FROM cte1 c1
CROSS JOIN cte2 c2
CROSS JOIN cte3 c3
CROSS JOIN cte4 c4
"#;

/// Total layoff events, to compare with the raw record count.
pub const FACT_COUNT: &str = "SELECT COUNT(*) AS total_layoff_events FROM fact_layoffs";

/// Distinct keys used by the fact table next to distinct keys in each
/// dimension: company, industry, location, date (fact, dimension) pairs.
pub const KEY_CARDINALITY: &str = r#"
SELECT
  (SELECT COUNT(DISTINCT "company_ID")  FROM fact_layoffs) AS company_id_fact,
  (SELECT COUNT(DISTINCT "company_ID")  FROM dim_company)  AS company_id_dim,
  (SELECT COUNT(DISTINCT "industry_ID") FROM fact_layoffs) AS industry_id_fact,
  (SELECT COUNT(DISTINCT "industry_ID") FROM dim_industry) AS industry_id_dim,
  (SELECT COUNT(DISTINCT "location_ID") FROM fact_layoffs) AS location_id_fact,
  (SELECT COUNT(DISTINCT "location_ID") FROM dim_location) AS location_id_dim,
  (SELECT COUNT(DISTINCT "date_ID")     FROM fact_layoffs) AS date_id_fact,
  (SELECT COUNT(DISTINCT "date_ID")     FROM dim_date)     AS date_id_dim
"#;

/// Layoff counts that look impossibly high or negative. Flagged, never
/// corrected. `?1` is the upper bound.
pub const OUTLIERS: &str = r#"
SELECT "company_ID", total_layoffs
FROM fact_layoffs
WHERE total_layoffs > ?1 OR total_layoffs < 0
ORDER BY rowid
"#;

/// Every event of a company that appears more than once, joined back to all
/// four dimensions so a reviewer can spot attributes drifting between events.
pub const REPEATED_COMPANIES: &str = r#"
SELECT f."company_ID", c.company, i.industry, l.headquarter_location, d."date"
FROM fact_layoffs f
JOIN dim_company  c ON c."company_ID"  = f."company_ID"
JOIN dim_industry i ON i."industry_ID" = f."industry_ID"
JOIN dim_location l ON l."location_ID" = f."location_ID"
JOIN dim_date     d ON d."date_ID"     = f."date_ID"
WHERE f."company_ID" IN (
  SELECT "company_ID" FROM fact_layoffs GROUP BY "company_ID" HAVING COUNT(*) > 1
)
ORDER BY c.company, f."company_ID", d."date"
"#;
