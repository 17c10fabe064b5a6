// src/services/document_service.rs

use std::path::{Path, PathBuf};

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    models::{auth::AuthUser, training::CertificateDetails},
    services::training_service::TrainingService,
};

const FONT_FAMILY: &str = "Roboto";

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

#[derive(Clone)]
pub struct DocumentService {
    trainings: TrainingService,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(trainings: TrainingService, fonts_dir: impl Into<PathBuf>) -> Self {
        Self { trainings, fonts_dir: fonts_dir.into() }
    }

    /// PDF do certificado, com QR code do número para conferência.
    pub async fn certificate_pdf(&self, actor: &AuthUser, certificate_id: i64) -> Result<(String, Vec<u8>), AppError> {
        let details = self.trainings.certificate_details(actor, certificate_id).await?;
        let number = details.certificate_number.clone();
        let fonts_dir = self.fonts_dir.clone();

        // genpdf é síncrono e pesado: fora do executor
        let bytes = tokio::task::spawn_blocking(move || render_certificate(&details, &fonts_dir))
            .await
            .map_err(pdf_error)??;

        tracing::info!(certificate_id, number = %number, size = bytes.len(), "PDF de certificado gerado");
        Ok((number, bytes))
    }
}

pub fn render_certificate(details: &CertificateDetails, fonts_dir: &Path) -> Result<Vec<u8>, AppError> {
    // 1. Fonte da pasta configurada (FONTS_DIR)
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|_| AppError::FontNotFound(format!("{}-*.ttf em {}", FONT_FAMILY, fonts_dir.display())))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Certificado {}", details.certificate_number));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(20);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    let mut title = elements::Paragraph::new("CERTIFICADO DE CONCLUSÃO");
    title.set_alignment(genpdf::Alignment::Center);
    doc.push(title.styled(style::Style::new().bold().with_font_size(22)));
    doc.push(elements::Break::new(2));

    let mut intro = elements::Paragraph::new("Certificamos que");
    intro.set_alignment(genpdf::Alignment::Center);
    doc.push(intro);

    let mut name = elements::Paragraph::new(details.employee_name.clone());
    name.set_alignment(genpdf::Alignment::Center);
    doc.push(name.styled(style::Style::new().bold().with_font_size(18)));
    doc.push(elements::Break::new(1));

    let mut body = elements::Paragraph::new(format!("concluiu o treinamento \"{}\"", details.training_title));
    body.set_alignment(genpdf::Alignment::Center);
    doc.push(body);

    if let Some(provider) = &details.provider {
        let mut by = elements::Paragraph::new(format!("oferecido por {}", provider));
        by.set_alignment(genpdf::Alignment::Center);
        doc.push(by.styled(style::Style::new().italic()));
    }

    doc.push(elements::Break::new(2));

    // --- DADOS ---
    let mut table = elements::TableLayout::new(vec![1, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    let mut rows: Vec<(&str, String)> = vec![
        ("Número", details.certificate_number.clone()),
        ("Conclusão", details.completion_date.format("%d/%m/%Y").to_string()),
        ("Emissão", details.issued_at.format("%d/%m/%Y").to_string()),
    ];
    if let Some(score) = details.score {
        rows.push(("Nota", format!("{:.2}", score)));
    }
    if let Some(expires) = details.expires_at {
        rows.push(("Validade", expires.format("%d/%m/%Y").to_string()));
    }

    for (label, value) in rows {
        table
            .row()
            .element(elements::Paragraph::new(label).styled(style_bold))
            .element(elements::Paragraph::new(value))
            .push()
            .map_err(pdf_error)?;
    }

    doc.push(table);
    doc.push(elements::Break::new(2));

    // --- QR CODE ---
    let code = QrCode::new(details.certificate_number.as_bytes()).map_err(pdf_error)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(pdf_error)?
        .with_alignment(genpdf::Alignment::Center)
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);

    // 2. Renderiza em memória
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn missing_fonts_are_reported() {
        let details = CertificateDetails {
            certificate_number: "CERT-0000ABCD".into(),
            issued_at: Utc::now(),
            expires_at: None,
            employee_name: "Maria Souza".into(),
            training_title: "Primeiros Socorros".into(),
            provider: None,
            completion_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            score: None,
        };

        let err = render_certificate(&details, Path::new("/nonexistent/fonts")).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
