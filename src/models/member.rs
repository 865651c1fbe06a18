use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

/// A person on the church roll. Exposed to clients as a "user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub marriage_status: Option<String>, // "SINGLE", "MARRIED", "WIDOW", "DIVORCED"
    pub education_status: Option<String>,
    pub baptized_year: Option<i32>,
    pub from_other_church: bool,
    pub work: Option<String>,
    pub zone_id: Option<Uuid>,
    pub family_id: Option<Uuid>,
    pub family_role: Option<String>, // "FATHER", "MOTHER", "SON", "DAUGHTER", "OTHER"
    pub current_ministry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarriageStatus {
    Single,
    Married,
    Widow,
    Divorced,
}

impl MarriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarriageStatus::Single => "SINGLE",
            MarriageStatus::Married => "MARRIED",
            MarriageStatus::Widow => "WIDOW",
            MarriageStatus::Divorced => "DIVORCED",
        }
    }

    /// Exact, case-sensitive match against the stored label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "SINGLE" => Some(MarriageStatus::Single),
            "MARRIED" => Some(MarriageStatus::Married),
            "WIDOW" => Some(MarriageStatus::Widow),
            "DIVORCED" => Some(MarriageStatus::Divorced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FamilyRole {
    Father,
    Mother,
    Son,
    Daughter,
    Other,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyRole::Father => "FATHER",
            FamilyRole::Mother => "MOTHER",
            FamilyRole::Son => "SON",
            FamilyRole::Daughter => "DAUGHTER",
            FamilyRole::Other => "OTHER",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "FATHER" => Some(FamilyRole::Father),
            "MOTHER" => Some(FamilyRole::Mother),
            "SON" => Some(FamilyRole::Son),
            "DAUGHTER" => Some(FamilyRole::Daughter),
            "OTHER" => Some(FamilyRole::Other),
            _ => None,
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, FamilyRole::Father | FamilyRole::Mother)
    }
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn marriage(&self) -> Option<MarriageStatus> {
        self.marriage_status.as_deref().and_then(MarriageStatus::from_label)
    }

    pub fn role_in_family(&self) -> Option<FamilyRole> {
        self.family_role.as_deref().and_then(FamilyRole::from_label)
    }

    pub fn is_baptized(&self) -> bool {
        self.baptized_year.is_some()
    }

    pub fn is_employed(&self) -> bool {
        self.work.as_deref().is_some_and(|w| !w.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberData {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub marriage_status: Option<MarriageStatus>,
    pub education_status: Option<String>,
    pub baptized_year: Option<i32>,
    #[serde(default)]
    pub from_other_church: bool,
    pub work: Option<String>,
    pub zone_id: Option<Uuid>,
    pub family_id: Option<Uuid>,
    pub family_role: Option<FamilyRole>,
    pub current_ministry_id: Option<Uuid>,
}

impl Member {
    /// Creates a new member record
    pub async fn create(pool: &PgPool, data: &MemberData) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (
                first_name, last_name, email, phone, gender, birth_date,
                marriage_status, education_status, baptized_year, from_other_church,
                work, zone_id, family_id, family_role, current_ministry_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.gender)
        .bind(data.birth_date)
        .bind(data.marriage_status.map(|s| s.as_str()))
        .bind(&data.education_status)
        .bind(data.baptized_year)
        .bind(data.from_other_church)
        .bind(&data.work)
        .bind(data.zone_id)
        .bind(data.family_id)
        .bind(data.family_role.map(|r| r.as_str()))
        .bind(data.current_ministry_id)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Replaces every editable field of a member
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &MemberData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            UPDATE members
            SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                gender = $6,
                birth_date = $7,
                marriage_status = $8,
                education_status = $9,
                baptized_year = $10,
                from_other_church = $11,
                work = $12,
                zone_id = $13,
                family_id = $14,
                family_role = $15,
                current_ministry_id = $16,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.gender)
        .bind(data.birth_date)
        .bind(data.marriage_status.map(|s| s.as_str()))
        .bind(&data.education_status)
        .bind(data.baptized_year)
        .bind(data.from_other_church)
        .bind(&data.work)
        .bind(data.zone_id)
        .bind(data.family_id)
        .bind(data.family_role.map(|r| r.as_str()))
        .bind(data.current_ministry_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Finds a member by their internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Finds a member by login email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Lists every member
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists the members assigned to a zone
    pub async fn list_by_zone(pool: &PgPool, zone_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members
            WHERE zone_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(zone_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists the members of a family
    pub async fn list_by_family(
        pool: &PgPool,
        family_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members
            WHERE family_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(family_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists the members joined to a ministry through the membership relation
    pub async fn list_by_ministry(
        pool: &PgPool,
        ministry_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, Self>(
            r#"
            SELECT m.* FROM members m
            INNER JOIN ministry_members mm ON mm.member_id = m.id
            WHERE mm.ministry_id = $1
            ORDER BY m.last_name, m.first_name
            "#,
        )
        .bind(ministry_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Points the member at a new current ministry
    pub async fn set_current_ministry<'e, E>(
        executor: E,
        id: Uuid,
        ministry_id: Option<Uuid>,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE members
            SET current_ministry_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ministry_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Deletes a member, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
