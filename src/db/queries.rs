use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Admin, Booking, BookingStatus, CarType, RatingBucket, RatingStats, Review, ServiceType,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, name, service_type, car_type, pickup_location, drop_location,
                               travel_date, travel_time, email, mobile, status, mirrored,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            booking.id,
            booking.name,
            booking.service_type.as_str(),
            booking.car_type.map(|c| c.as_str()),
            booking.pickup_location,
            booking.drop_location,
            booking.travel_date,
            booking.travel_time,
            booking.email,
            booking.mobile,
            booking.status.as_str(),
            booking.mirrored as i32,
            booking.created_at.format(TS_FORMAT).to_string(),
            booking.updated_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, service_type, car_type, pickup_location, drop_location,
                travel_date, travel_time, email, mobile, status, mirrored, created_at, updated_at
         FROM bookings ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, name, service_type, car_type, pickup_location, drop_location,
                travel_date, travel_time, email, mobile, status, mirrored, created_at, updated_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

pub fn set_booking_mirrored(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE bookings SET mirrored = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

pub fn mark_all_bookings_mirrored(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute("UPDATE bookings SET mirrored = 1", [])?;
    Ok(count)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let service_type_str: String = row.get(2)?;
    let car_type_str: Option<String> = row.get(3)?;
    let pickup_location: String = row.get(4)?;
    let drop_location: String = row.get(5)?;
    let travel_date: String = row.get(6)?;
    let travel_time: String = row.get(7)?;
    let email: Option<String> = row.get(8)?;
    let mobile: String = row.get(9)?;
    let status_str: String = row.get(10)?;
    let mirrored: bool = row.get::<_, i32>(11)? != 0;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    let service_type = ServiceType::parse(&service_type_str)
        .ok_or_else(|| anyhow::anyhow!("unknown service type: {service_type_str}"))?;

    Ok(Booking {
        id,
        name,
        service_type,
        car_type: car_type_str.as_deref().and_then(CarType::parse),
        pickup_location,
        drop_location,
        travel_date,
        travel_time,
        email,
        mobile,
        status: BookingStatus::parse(&status_str),
        mirrored,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

// ── Reviews ──

pub fn create_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, customer_name, booking_id, rating, comment, verified,
                              verified_by, verified_at, trip_date, service_type, approved,
                              mirrored, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            review.id,
            review.customer_name,
            review.booking_id,
            review.rating,
            review.comment,
            review.verified as i32,
            review.verified_by,
            review
                .verified_at
                .map(|t| t.format(TS_FORMAT).to_string()),
            review.trip_date,
            review.service_type.as_str(),
            review.approved as i32,
            review.mirrored as i32,
            review.created_at.format(TS_FORMAT).to_string(),
            review.updated_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

const REVIEW_COLUMNS: &str = "id, customer_name, booking_id, rating, comment, verified, \
                              verified_by, verified_at, trip_date, service_type, approved, \
                              mirrored, created_at, updated_at";

pub fn get_review_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_review_row(row)));

    match result {
        Ok(review) => Ok(Some(review?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn review_exists_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_public_reviews(
    conn: &Connection,
    only_verified: bool,
    limit: i64,
) -> anyhow::Result<Vec<Review>> {
    let sql = if only_verified {
        format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE approved = 1 AND verified = 1
             ORDER BY created_at DESC, id DESC LIMIT ?1"
        )
    } else {
        format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE approved = 1
             ORDER BY created_at DESC, id DESC LIMIT ?1"
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

pub fn get_all_reviews(conn: &Connection) -> anyhow::Result<Vec<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

pub fn get_verified_reviews(conn: &Connection) -> anyhow::Result<Vec<Review>> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE verified = 1 AND approved = 1
         ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

pub fn verify_review(conn: &Connection, id: &str, admin_id: &str) -> anyhow::Result<bool> {
    let now = now_str();
    let count = conn.execute(
        "UPDATE reviews SET verified = 1, verified_by = ?1, verified_at = ?2, updated_at = ?2
         WHERE id = ?3",
        params![admin_id, now, id],
    )?;
    Ok(count > 0)
}

pub fn set_review_mirrored(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute("UPDATE reviews SET mirrored = 1 WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn mark_verified_reviews_mirrored(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE reviews SET mirrored = 1 WHERE verified = 1 AND approved = 1",
        [],
    )?;
    Ok(count)
}

pub fn delete_review(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM reviews WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_review_row(row: &rusqlite::Row) -> anyhow::Result<Review> {
    let id: String = row.get(0)?;
    let customer_name: String = row.get(1)?;
    let booking_id: String = row.get(2)?;
    let rating: i64 = row.get(3)?;
    let comment: String = row.get(4)?;
    let verified: bool = row.get::<_, i32>(5)? != 0;
    let verified_by: Option<String> = row.get(6)?;
    let verified_at_str: Option<String> = row.get(7)?;
    let trip_date: String = row.get(8)?;
    let service_type_str: String = row.get(9)?;
    let approved: bool = row.get::<_, i32>(10)? != 0;
    let mirrored: bool = row.get::<_, i32>(11)? != 0;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    let service_type = ServiceType::parse(&service_type_str)
        .ok_or_else(|| anyhow::anyhow!("unknown service type: {service_type_str}"))?;

    Ok(Review {
        id,
        customer_name,
        booking_id,
        rating,
        comment,
        verified,
        verified_by,
        verified_at: verified_at_str.as_deref().map(parse_ts),
        trip_date,
        service_type,
        approved,
        mirrored,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

// ── Rating stats ──

pub fn get_rating_stats(conn: &Connection) -> anyhow::Result<RatingStats> {
    let (avg, count): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(rating), COUNT(*) FROM reviews WHERE verified = 1 AND approved = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    // AVG over zero rows is NULL, never a division error.
    Ok(RatingStats {
        average_rating: avg.unwrap_or(0.0),
        total_reviews: count,
    })
}

pub fn get_rating_distribution(conn: &Connection) -> anyhow::Result<Vec<RatingBucket>> {
    let mut stmt = conn.prepare(
        "SELECT rating, COUNT(*) FROM reviews WHERE verified = 1 AND approved = 1
         GROUP BY rating ORDER BY rating DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(RatingBucket {
            rating: row.get(0)?,
            count: row.get(1)?,
        })
    })?;

    let mut buckets = vec![];
    for row in rows {
        buckets.push(row?);
    }
    Ok(buckets)
}

// ── Admins ──

/// Insert the one-and-only admin row. Returns false when an admin already
/// exists: the fixed singleton key turns the one-admin rule into an atomic
/// constraint instead of a racy count-then-insert.
pub fn create_admin(conn: &Connection, admin: &Admin) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO admins (singleton, id, email, password_hash, name, role, active, created_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            admin.id,
            admin.email,
            admin.password_hash,
            admin.name,
            admin.role,
            admin.active as i32,
            admin.created_at.format(TS_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn admin_exists(conn: &Connection) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn get_admin_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Admin>> {
    let result = conn.query_row(
        "SELECT id, email, password_hash, name, role, active, created_at
         FROM admins WHERE email = ?1",
        params![email],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i32>(5)?,
                row.get::<_, String>(6)?,
            ))
        },
    );

    match result {
        Ok((id, email, password_hash, name, role, active, created_at)) => Ok(Some(Admin {
            id,
            email,
            password_hash,
            name,
            role,
            active: active != 0,
            created_at: parse_ts(&created_at),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
