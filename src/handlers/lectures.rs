use actix_web::{web, HttpResponse};
use log::error;

use crate::error::{AppError, AppResult};
use crate::models::{Lecture, LectureDetail, LectureTasks};
use crate::services::outline;
use crate::services::{LectureSource, TasksCache, TasksParser};

async fn find_lecture(source: &dyn LectureSource, slug: &str) -> AppResult<Lecture> {
    match source.get(slug).await {
        Ok(Some(lecture)) => Ok(lecture),
        Ok(None) => Err(AppError::NotFound(format!("lecture '{}'", slug))),
        Err(e) => {
            error!("Failed to load lecture {}: {:#}", slug, e);
            Err(e.into())
        }
    }
}

/// List all lectures
pub async fn list_lectures(source: web::Data<dyn LectureSource>) -> AppResult<HttpResponse> {
    let lectures = source.list().await.map_err(|e| {
        error!("Failed to list lectures: {:#}", e);
        AppError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(lectures))
}

/// Get lecture with its tabs and outline
pub async fn get_lecture(
    path: web::Path<String>,
    source: web::Data<dyn LectureSource>,
) -> AppResult<HttpResponse> {
    let lecture = find_lecture(source.get_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(LectureDetail {
        tabs: lecture.tabs(),
        outline: outline::outline(&lecture.content),
        lecture,
    }))
}

/// Get parsed tasks of a lecture. Lectures without tasks give an empty structure.
pub async fn get_lecture_tasks(
    path: web::Path<String>,
    source: web::Data<dyn LectureSource>,
    parser: web::Data<TasksParser>,
    cache: web::Data<TasksCache>,
) -> AppResult<HttpResponse> {
    let lecture = find_lecture(source.get_ref(), &path).await?;

    let tasks = match lecture.tasks_content.as_deref() {
        Some(content) => cache.get_or_parse(content, &parser).await,
        None => LectureTasks::default(),
    };

    Ok(HttpResponse::Ok().json(tasks))
}
